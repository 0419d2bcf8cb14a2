//! Random v4 UUIDs (`dig uuid`, `dig 5.uuid`).

use crate::error::ServiceError;
use crate::service::Service;

/// The `uuid` service.
pub struct Uuid {
    max_results: usize,
}

impl Uuid {
    /// Create the service; `max_results` caps how many UUIDs a single
    /// query may request.
    pub fn new(max_results: usize) -> Self {
        Self {
            max_results: max_results.max(1),
        }
    }
}

impl Service for Uuid {
    fn query(&self, q: &str) -> Result<Vec<String>, ServiceError> {
        // A bare `dig uuid` leaves the un-stripped suffix as the
        // argument; treat it as a request for one.
        let num = if q == "uuid." {
            1
        } else {
            match q.parse::<usize>() {
                Ok(n) if (1..=self.max_results).contains(&n) => n,
                _ => {
                    return Err(ServiceError::new(format!(
                        "provide 1-{}.uuid",
                        self.max_results
                    )))
                }
            }
        };

        Ok((0..num)
            .map(|_| format!("{} 1 TXT \"{}\"", q, uuid::Uuid::new_v4()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_query_yields_one() {
        let out = Uuid::new(50).query("uuid.").unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].starts_with("uuid. 1 TXT \""), "got {}", out[0]);
    }

    #[test]
    fn counted_query_yields_that_many_unique_ids() {
        let out = Uuid::new(50).query("5").unwrap();
        assert_eq!(out.len(), 5);
        let mut ids: Vec<&str> = out
            .iter()
            .map(|a| a.split('"').nth(1).unwrap())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn out_of_range_counts_are_rejected() {
        for q in ["0", "51", "hello"] {
            let err = Uuid::new(50).query(q).unwrap_err();
            assert_eq!(err.0, "provide 1-50.uuid", "query {:?}", q);
        }
    }
}
