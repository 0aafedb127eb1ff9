//! Rows inserted on first boot, each table only while it is empty.

pub const DEFAULT_SOURCES: [(&str, &str); 4] = [
    ("https://habr.com/ru/rss/best/daily/?fl=ru", "Хабр - лучшее за день"),
    ("https://www.opennet.ru/opennews/opennews_all_utf.rss", "OpenNet - Новости"),
    ("https://rss.dw.com/xml/rss-ru-all", "Deutsche Welle"),
    ("https://3dnews.ru/news/rss/", "3DNews - Новости"),
];

pub const DEFAULT_KEYWORDS: [&str; 6] = [
    "технологии",
    "наука",
    "программирование",
    "интернет",
    "безопасность",
    "Linux",
];
