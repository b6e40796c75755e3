pub mod error;
pub mod evidence;
pub mod extractor;
pub mod html;
pub mod proxy;
#[cfg(feature = "readability")]
pub(crate) mod readability;
pub mod search;
pub mod security;

pub use error::{FetchError, FetchResult, SecurityError, SecurityResult};
pub use evidence::{EvidenceFetcher, DEFAULT_MAX_RESULTS};
pub use extractor::{blocked_message, ArticleExtractor, BLOCKING_STATUSES, EXHAUSTED_MESSAGE};
pub use search::{DuckDuckGoSearcher, SerperSearcher, WebSearcher};
pub use security::{
    is_disallowed_ip, GuardedResolver, HostResolver, StaticResolver, SystemResolver,
    UrlValidator,
};
