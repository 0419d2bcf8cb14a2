//! Geonames.org city database used by the time service.
//!
//! Loads a tab-separated city dump and indexes it by cleaned city name.
//! A lookup keyword may carry a `/cc` country filter ("paris/us").

use chrono_tz::Tz;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::Error;

/// A geographic location with a resolvable time zone.
#[derive(Debug, Clone)]
pub struct Location {
    /// Display name ("Mumbai").
    pub name: String,
    /// IANA zone name ("Asia/Kolkata").
    pub tz_name: String,
    /// ISO country code ("IN").
    pub country: String,
    /// Population, used for ranking ambiguous names.
    pub population: u64,
    /// Parsed time zone.
    pub tz: Tz,
}

/// Keyword -> locations index.
pub struct Geo {
    index: HashMap<String, Vec<Location>>,
    count: usize,
}

fn clean(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .filter(|&c| c.is_ascii_lowercase() || c == '/')
        .collect()
}

impl Geo {
    /// Load a geonames-style TSV file. Rows that are not 19 columns or
    /// carry an unknown time zone are skipped.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let raw = fs::read_to_string(path)?;
        Ok(Self::from_tsv(&raw))
    }

    /// Build the index from TSV content.
    pub fn from_tsv(raw: &str) -> Self {
        let mut locations = Vec::new();
        for line in raw.lines() {
            let cols: Vec<&str> = line.split('\t').collect();
            if cols.len() != 19 {
                continue;
            }

            let tz_name = cols[17].trim();
            let tz: Tz = match tz_name.parse() {
                Ok(tz) => tz,
                Err(_) => continue,
            };

            // Drop any parenthesized qualifier from the name.
            let name = cols[2].split('(').next().unwrap_or("").trim();
            if name.is_empty() {
                continue;
            }

            locations.push(Location {
                name: name.to_string(),
                tz_name: tz_name.to_string(),
                country: cols[8].trim().to_string(),
                population: cols[14].trim().parse().unwrap_or(0),
                tz,
            });
        }

        let mut geo = Self {
            index: HashMap::new(),
            count: 0,
        };
        geo.load(locations);
        geo
    }

    /// Number of indexed city names.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Look up locations by keyword, optionally filtered by a `/cc`
    /// country suffix. Returns them most-populous first.
    pub fn query(&self, q: &str) -> Vec<Location> {
        let mut keyword = q;
        let mut country = None;

        let parts: Vec<&str> = q.split('/').collect();
        if parts.len() == 2 && parts[1].len() == 2 {
            keyword = parts[0];
            country = Some(parts[1].to_ascii_uppercase());
        }

        let keyword = clean(keyword);
        let Some(zones) = self.index.get(&keyword) else {
            return Vec::new();
        };

        match country {
            Some(cc) => zones.iter().filter(|z| z.country == cc).cloned().collect(),
            None => zones.clone(),
        }
    }

    fn load(&mut self, locations: Vec<Location>) {
        for loc in &locations {
            let name = clean(&loc.name);
            self.index.entry(name).or_default().push(loc.clone());
            self.count += 1;
        }

        // Zone-name cities ("Kolkata" from "Asia/Kolkata") that aren't
        // in the map get an entry of their own.
        for loc in &locations {
            let Some(city) = loc.tz_name.split('/').nth(1) else {
                continue;
            };
            let city = clean(city);
            self.index.entry(city).or_insert_with(|| vec![loc.clone()]);
        }

        // Bigger cities are likelier lookups; rank them first.
        for zones in self.index.values_mut() {
            zones.sort_by(|a, b| b.population.cmp(&a.population));
        }

        debug!(names = self.index.len(), locations = self.count, "geo index loaded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Columns: id, -, name, -, lat, lon, -, -, country, -, -, -, -, -,
    // population, -, -, timezone, -
    fn row(name: &str, country: &str, population: u64, tz: &str) -> String {
        let mut cols = vec![""; 19];
        let pop = population.to_string();
        cols[0] = "1";
        cols[2] = name;
        cols[8] = country;
        cols[14] = &pop;
        cols[17] = tz;
        cols.join("\t")
    }

    fn sample() -> Geo {
        let tsv = [
            row("Mumbai", "IN", 12442373, "Asia/Kolkata"),
            row("Paris", "FR", 2138551, "Europe/Paris"),
            row("Paris", "US", 24171, "America/Chicago"),
        ]
        .join("\n");
        Geo::from_tsv(&tsv)
    }

    #[test]
    fn finds_city_case_insensitively() {
        let geo = sample();
        let locs = geo.query("mumbai");
        assert_eq!(locs.len(), 1);
        assert_eq!(locs[0].tz_name, "Asia/Kolkata");
        assert_eq!(locs[0].country, "IN");
    }

    #[test]
    fn ranks_by_population() {
        let geo = sample();
        let locs = geo.query("paris");
        assert_eq!(locs.len(), 2);
        assert_eq!(locs[0].country, "FR");
        assert_eq!(locs[1].country, "US");
    }

    #[test]
    fn filters_by_country_code() {
        let geo = sample();
        let locs = geo.query("paris/us");
        assert_eq!(locs.len(), 1);
        assert_eq!(locs[0].country, "US");
    }

    #[test]
    fn indexes_zone_city_names() {
        let geo = sample();
        let locs = geo.query("kolkata");
        assert_eq!(locs.len(), 1);
        assert_eq!(locs[0].name, "Mumbai");
    }

    #[test]
    fn skips_malformed_rows() {
        let geo = Geo::from_tsv("too\tfew\tcolumns\nnot a row at all");
        assert_eq!(geo.count(), 0);
        assert!(geo.query("too").is_empty());
    }
}
