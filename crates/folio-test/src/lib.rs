//! # Folio Test
//!
//! In-memory HTTP testing for the Folio report server. Requests go through
//! routing, extraction, export and error mapping without binding a port.
//!
//! ## Example
//!
//! ```ignore
//! use folio_core::ExportType;
//! use folio_test::TestClient;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn exports_pdf() {
//!     let client = TestClient::from_service(service).unwrap();
//!
//!     client
//!         .post("/reports/pdf")
//!         .json(&json!({"columns": {"firstName": "First name"}}))
//!         .send()
//!         .await
//!         .assert_document(ExportType::Pdf);
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/folio-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::TestRequest;
pub use response::TestResponse;
