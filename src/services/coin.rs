//! Coin tosses (`dig coin`, `dig 5.coin`).

use rand::Rng;

use crate::error::ServiceError;
use crate::service::Service;

const MAX_TOSSES: u32 = 42;

/// The `coin` service.
pub struct Coin;

impl Coin {
    /// Create the service.
    pub fn new() -> Self {
        Self
    }
}

impl Default for Coin {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for Coin {
    fn query(&self, q: &str) -> Result<Vec<String>, ServiceError> {
        // A bare `dig coin` leaves the un-stripped suffix as the
        // argument; treat it as a single toss.
        let tosses: u32 = if q == "coin." {
            1
        } else {
            q.parse()
                .map_err(|_| ServiceError::from("invalid coin toss query"))?
        };

        if tosses > MAX_TOSSES {
            return Err("toss overflow".into());
        }

        let mut rng = rand::thread_rng();
        let results: Vec<&str> = (0..tosses)
            .map(|_| if rng.gen::<bool>() { "heads" } else { "tails" })
            .collect();

        Ok(vec![format!("{} 1 TXT \"tossed = [{}]\"", q, results.join(", "))])
    }
}
