//! Asset name tables. Grading compares prices by position, so the order of
//! each table is part of the protocol.

/// Assets the network launched with.
pub const V1_ASSETS: &[&str] = &[
    "PNT", "USD", "EUR", "JPY", "GBP", "CAD", "CHF", "INR", "SGD", "CNY", "HKD", "KRW", "BRL",
    "PHP", "MXN", "XAU", "XAG", "XPD", "XPT", "XBT", "ETH", "LTC", "RVN", "XBC", "FCT", "BNB",
    "XLM", "ADA", "XMR", "DASH", "ZEC", "DCR",
];

/// V1 with PNT renamed to PEG and both XPD and XPT dropped.
pub const V2_ASSETS: &[&str] = &[
    "PEG", "USD", "EUR", "JPY", "GBP", "CAD", "CHF", "INR", "SGD", "CNY", "HKD", "KRW", "BRL",
    "PHP", "MXN", "XAU", "XAG", "XBT", "ETH", "LTC", "RVN", "XBC", "FCT", "BNB", "XLM", "ADA",
    "XMR", "DASH", "ZEC", "DCR",
];

pub const V4_ASSETS: &[&str] = &[
    "PEG", "USD", "EUR", "JPY", "GBP", "CAD", "CHF", "INR", "SGD", "CNY", "HKD", "KRW", "BRL",
    "PHP", "MXN", "XAU", "XAG", "XBT", "ETH", "LTC", "RVN", "XBC", "FCT", "BNB", "XLM", "ADA",
    "XMR", "DASH", "ZEC", "DCR", // V2 set
    "AUD", "NZD", "SEK", "NOK", "RUB", "ZAR", "TRY", "EOS", "LINK", "ATOM", "BAT", "XTZ",
];

pub const V5_ASSETS: &[&str] = &[
    "PEG", "USD", "EUR", "JPY", "GBP", "CAD", "CHF", "INR", "SGD", "CNY", "HKD", "KRW", "BRL",
    "PHP", "MXN", "XAU", "XAG", "XBT", "ETH", "LTC", "RVN", "XBC", "FCT", "BNB", "XLM", "ADA",
    "XMR", "DASH", "ZEC", "DCR", "AUD", "NZD", "SEK", "NOK", "RUB", "ZAR", "TRY", "EOS", "LINK",
    "ATOM", "BAT", "XTZ", // V4 set
    "HBAR", "NEO", "AED", "CRO", "ETC", "ONT", "DOGE", "VET", "HT", "ALGO", "ARS", "TWD", "RWF",
    "KES", "UGX", "TZS", "BIF", "ETB", "DGB", "NGN",
];
