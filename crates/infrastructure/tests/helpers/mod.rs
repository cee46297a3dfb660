pub mod builders;
pub mod test_server;

#[allow(unused_imports)]
pub use builders::{ClientBuilder, RequestBuilder};
#[allow(unused_imports)]
pub use test_server::{TestDnsServer, TestServerConfig, TEST_ADDRESS, TEST_DOMAIN, TEST_TTL};
