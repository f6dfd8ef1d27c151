// Data source URL (CGU open data portal, terceirizados file listing)
pub const BASE_URL: &str =
    "https://www.gov.br/cgu/pt-br/acesso-a-informacao/dados-abertos/arquivos/terceirizados/arquivos/";

// The portal rejects requests that do not carry a browser user-agent.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0.0.0 Safari/537.36";

// Listing pagination
pub const PAGE_SIZE: usize = 20;

// Selectors and Patterns
pub const ENTRY_SELECTOR: &str = "article.entry";
pub const ENTRY_LINK_SELECTOR: &str = "a[href]";
pub const YEAR_REGEX_PATTERN: &str = r"\d{4}";
pub const MONTH_REGEX_PATTERN: &str = r"\d{1,2}";

// The listing links point at an HTML preview page (`/view`); the actual file
// bytes live behind the Plone download endpoint. The rewrite must be literal.
pub const VIEW_SUFFIX: &str = "/view";
pub const DOWNLOAD_SUFFIX: &str = "/@@download/file";

// Format of the Last-Modified header served by the portal
pub const LAST_MODIFIED_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Month number to lowercase Portuguese month name, in match-priority order.
/// When a free-form input names several months, the first table entry that
/// matches wins (01 through 12), not the first occurrence in the string.
pub const MONTHS: &[(&str, &str)] = &[
    ("01", "janeiro"),
    ("02", "fevereiro"),
    ("03", "marco"),
    ("04", "abril"),
    ("05", "maio"),
    ("06", "junho"),
    ("07", "julho"),
    ("08", "agosto"),
    ("09", "setembro"),
    ("10", "outubro"),
    ("11", "novembro"),
    ("12", "dezembro"),
];

// Status codes retried transparently by the transport layer
pub const RETRYABLE_STATUS_CODES: &[u16] = &[429, 500, 502, 503, 504];
