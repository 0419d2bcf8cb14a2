//! Numbers to English words (`123456.words`).

use crate::error::ServiceError;
use crate::service::Service;

const SMALL: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

const SCALE: [&str; 4] = ["", "thousand", "million", "billion"];

/// Largest magnitude expressible with the scale table.
const LIMIT: i64 = 1_000_000_000_000;

/// The `words` service.
pub struct Num2Words;

impl Num2Words {
    /// Create the service.
    pub fn new() -> Self {
        Self
    }
}

impl Default for Num2Words {
    fn default() -> Self {
        Self::new()
    }
}

impl Service for Num2Words {
    fn query(&self, q: &str) -> Result<Vec<String>, ServiceError> {
        let num: i64 = q.parse().map_err(|_| ServiceError::from("invalid number."))?;
        if num.abs() >= LIMIT {
            return Err("number is too large.".into());
        }

        let words = convert(num);
        Ok(vec![format!("{} 1 TXT \"{} = {}\"", q, num, words)])
    }
}

fn convert(number: i64) -> String {
    if number == 0 {
        return SMALL[0].to_string();
    }

    // Split into three-digit groups, least significant first.
    let mut groups = [0u64; 4];
    let mut positive = number.unsigned_abs();
    for group in groups.iter_mut() {
        *group = positive % 1000;
        positive /= 1000;
    }

    let mut combined = group_to_text(groups[0]);
    for i in 1..groups.len() {
        if groups[i] != 0 {
            let mut prefix = format!("{} {}", group_to_text(groups[i]), SCALE[i]);
            if !combined.is_empty() {
                prefix.push(' ');
            }
            combined = prefix + &combined;
        }
    }

    if number < 0 {
        combined = format!("minus {}", combined);
    }

    combined
}

fn group_to_text(group: u64) -> String {
    let mut out = String::new();

    let hundreds = (group / 100) as usize;
    let tens_units = (group % 100) as usize;

    if hundreds != 0 {
        out.push_str(SMALL[hundreds]);
        out.push_str(" hundred");
        if tens_units != 0 {
            out.push(' ');
        }
    }

    let tens = tens_units / 10;
    let units = tens_units % 10;

    if tens >= 2 {
        out.push_str(TENS[tens]);
        if units != 0 {
            out.push('-');
            out.push_str(SMALL[units]);
        }
    } else if tens_units != 0 {
        out.push_str(SMALL[tens_units]);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_numbers() {
        assert_eq!(convert(0), "zero");
        assert_eq!(convert(7), "seven");
        assert_eq!(convert(13), "thirteen");
        assert_eq!(convert(42), "forty-two");
        assert_eq!(convert(100), "one hundred");
        assert_eq!(convert(101), "one hundred one");
    }

    #[test]
    fn large_numbers() {
        assert_eq!(convert(1000), "one thousand");
        assert_eq!(
            convert(123_456),
            "one hundred twenty-three thousand four hundred fifty-six"
        );
        assert_eq!(convert(-5), "minus five");
    }

    #[test]
    fn query_formats_answer() {
        let out = Num2Words::new().query("123456").unwrap();
        assert_eq!(
            out,
            vec![
                "123456 1 TXT \"123456 = one hundred twenty-three thousand four hundred fifty-six\""
                    .to_string()
            ]
        );
    }

    #[test]
    fn out_of_range_is_rejected() {
        let err = Num2Words::new().query("1000000000000").unwrap_err();
        assert_eq!(err.0, "number is too large.");
    }

    #[test]
    fn garbage_is_rejected() {
        let err = Num2Words::new().query("12x4").unwrap_err();
        assert_eq!(err.0, "invalid number.");
    }
}
