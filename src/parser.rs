//! Parsing of `key: value` blocks returned by the extraction model.

use crate::error::{InsightError, Result};
use crate::models::{InsightRecord, NOT_AVAILABLE};
use log::debug;

/// Splits a block of `key: value` lines into ordered pairs
///
/// Keys and values are trimmed. A value containing further colons keeps them,
/// so `social_media: https://x.com` stays a URL. Lines without a colon are dropped.
pub fn parse_key_values(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Maps a model answer onto the fixed 8-field insight schema
///
/// Missing or empty fields become `N/A`, unknown keys are ignored. An answer
/// that names none of the 8 fields breaks the extraction contract.
pub fn parse_insight(text: &str) -> Result<InsightRecord> {
    let mut record = InsightRecord::default();
    let mut recognised = 0;

    for (key, value) in parse_key_values(text) {
        let Some(slot) = field_slot(&mut record, &key) else {
            debug!("ignoring unexpected field '{}'", key);
            continue;
        };
        recognised += 1;
        if !value.is_empty() {
            *slot = value;
        } else {
            *slot = NOT_AVAILABLE.to_string();
        }
    }

    if recognised == 0 {
        return Err(InsightError::Contract(format!(
            "expected the fields {} but the answer contained none of them: {:?}",
            InsightRecord::FIELDS.join(", "),
            truncate(text, 120)
        )));
    }
    Ok(record)
}

fn field_slot<'a>(record: &'a mut InsightRecord, key: &str) -> Option<&'a mut String> {
    let normalised = key
        .trim_matches(|c: char| c == '*' || c == '-' || c.is_whitespace())
        .to_lowercase()
        .replace([' ', '-'], "_");

    let slot = match normalised.as_str() {
        "name" => &mut record.name,
        "country" => &mut record.country,
        "city" => &mut record.city,
        "email" => &mut record.email,
        "occupation" => &mut record.occupation,
        "programming_languages" => &mut record.programming_languages,
        "topics_of_interest" | "topic_of_interest" => &mut record.topics_of_interest,
        "social_media" => &mut record.social_media,
        _ => return None,
    };
    Some(slot)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn recovers_keys_and_trimmed_values() {
        let pairs = parse_key_values("name:  logicx \n  city : Atlanta\nemail:abc@gatech.edu\n");
        assert_eq!(
            pairs,
            vec![
                ("name".to_string(), "logicx".to_string()),
                ("city".to_string(), "Atlanta".to_string()),
                ("email".to_string(), "abc@gatech.edu".to_string()),
            ]
        );
    }

    #[test]
    fn keeps_colons_inside_values() {
        let pairs = parse_key_values("social_media: https://www.logicx.io, http://x.com:8080/a");
        assert_eq!(pairs[0].1, "https://www.logicx.io, http://x.com:8080/a");
    }

    #[test]
    fn drops_lines_without_colon() {
        let pairs = parse_key_values("Here is the result\n\nname: Ada\n");
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn full_answer_fills_every_field() {
        let answer = "name: logicx\ncountry: United States\ncity: Atlanta\nemail: abc@gatech.edu\n\
                      occupation: PhD student at Georgia Tech\nprogramming_languages: Python, Java\n\
                      topics_of_interest: Google Colab, fake data generation, Postgres\n\
                      social_media: https://www.logicx.io, https://www.twitter.com/logicx";
        let record = parse_insight(answer).unwrap();

        assert_eq!(
            record,
            InsightRecord {
                name: "logicx".into(),
                country: "United States".into(),
                city: "Atlanta".into(),
                email: "abc@gatech.edu".into(),
                occupation: "PhD student at Georgia Tech".into(),
                programming_languages: "Python, Java".into(),
                topics_of_interest: "Google Colab, fake data generation, Postgres".into(),
                social_media: "https://www.logicx.io, https://www.twitter.com/logicx".into(),
            }
        );
    }

    #[test]
    fn missing_fields_default_to_not_available() {
        let record = parse_insight("name: Ada\nTopics of interest: compilers\nhobby: chess\ncity:").unwrap();
        assert_eq!(record.name, "Ada");
        assert_eq!(record.topics_of_interest, "compilers");
        assert_eq!(record.city, NOT_AVAILABLE);
        assert_eq!(record.country, NOT_AVAILABLE);
        assert_eq!(record.social_media, NOT_AVAILABLE);
    }

    #[test]
    fn answer_without_schema_fields_is_rejected() {
        let err = parse_insight("I'm sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, InsightError::Contract(_)));
    }
}
