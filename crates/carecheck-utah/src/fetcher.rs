//! Facility metadata fetch

use carecheck_core::{Fetch, download_with_retry};

use crate::api::{FacilityResponse, parse_facility};
use crate::config::Config;
use crate::model::Id;

/// Fetch and parse one facility document.
///
/// `None` when the download is exhausted or the body is not facility JSON;
/// both are logged and the caller skips the facility.
pub fn fetch_facility(fetch: &dyn Fetch, config: &Config, id: &Id) -> Option<FacilityResponse> {
    let url = config.facility_url_for(id);
    let Some(body) = download_with_retry(fetch, &url, &config.retry) else {
        log::warn!("Facility {id}: failed after retries");
        return None;
    };
    match parse_facility(&body) {
        Ok(facility) => {
            log::info!(
                "Facility {id}: {} ({} inspections)",
                facility.name,
                facility.inspections.len()
            );
            Some(facility)
        }
        Err(e) => {
            log::warn!("Facility {id}: invalid JSON from {url}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use carecheck_core::{FetchError, RetryPolicy};

    use super::*;

    struct Responder {
        body: Result<&'static [u8], u16>,
        urls: RefCell<Vec<String>>,
    }

    impl Fetch for Responder {
        fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.urls.borrow_mut().push(url.to_string());
            self.body.map(<[u8]>::to_vec).map_err(|status| FetchError::Status {
                status,
                message: "scripted".to_string(),
            })
        }
    }

    fn config() -> Config {
        Config {
            facility_ids: vec![Id::Number(7)],
            retry: RetryPolicy::immediate(3),
            ..Default::default()
        }
    }

    #[test]
    fn parses_facility() {
        let fetch = Responder {
            body: Ok(br#"{"name": "Red Rock Academy", "inspections": []}"#),
            urls: RefCell::default(),
        };
        let facility = fetch_facility(&fetch, &config(), &Id::Number(7)).unwrap();
        assert_eq!(facility.name, "Red Rock Academy");
        assert_eq!(
            *fetch.urls.borrow(),
            vec!["https://ccl.utah.gov/ccl/public/facilities/7.json"]
        );
    }

    #[test]
    fn not_found_is_retried_then_skipped() {
        let fetch = Responder {
            body: Err(404),
            urls: RefCell::default(),
        };
        assert!(fetch_facility(&fetch, &config(), &Id::Number(7)).is_none());
        assert_eq!(fetch.urls.borrow().len(), 3);
    }

    #[test]
    fn bad_json_is_skipped() {
        let fetch = Responder {
            body: Ok(b"<html>maintenance</html>"),
            urls: RefCell::default(),
        };
        assert!(fetch_facility(&fetch, &config(), &Id::Number(7)).is_none());
        assert_eq!(fetch.urls.borrow().len(), 1);
    }
}
