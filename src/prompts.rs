/// Instructions for extracting the 8 insight fields from profile text
pub const EXTRACTION_PROMPT: &str = r#"You are given a block of disorganized text extracted from the GitHub user profile of a user using an automated web scraper. The goal is to get structured results from this data.
Extract the following fields from the text: name, country, city, email, occupation, programming_languages, topics_of_interest, social_media.
If some field is not found, just output fieldname: N/A. Always return all the 8 field names. DO NOT add any additional text to your output.
The topics_of_interest field must list a broad range of technical topics that are mentioned in any portion of the text. This field is the most important, so add as much information as you can. Do not add non-technical interests.
The programming_languages field can contain one or more programming languages out of only the following 4 programming languages - Python, C++, JavaScript, Java. Do not include any other language outside these 4 languages in the output. If the user is not interested in any of these 4 programming languages, output N/A.
If the country is not available, use the city field to fill the country. For example, if the city is New York, fill the country as United States.
If there are social media links, including personal websites, add them to the social media section. Do NOT add social media links that are not present.
Here is an example (use it only for the output format, not for the content):

name: logicx
country: United States
city: Atlanta
email: abc@gatech.edu
occupation: PhD student at Georgia Tech
programming_languages: Python, Java
topics_of_interest: Google Colab, fake data generation, Postgres
social_media: https://www.logicx.io, https://www.twitter.com/logicx, https://www.linkedin.com/in/logicx"#;

const CATEGORIZATION_PROMPT: &str = r#"You are given {rows} rows of input, each row is separated by two new line characters.
Categorize the topics listed in each row into one or more of the following 3 technical areas - Machine Learning, Databases, and Web development. If the topics listed are not related to any of these 3 areas, output a single N/A. Do not miss any input row. Do not add any additional text or numbers to your output.
The output rows must be separated by two new line characters. Each input row must generate exactly one output row. For example, the input row [Recommendation systems, Deep neural networks, Postgres] must generate only the output row [Machine Learning, Databases].
The input row [enterpreneurship, startups, venture capital] must generate the output row N/A."#;

/// Categorization instructions for a batch of `rows` interest strings
pub fn categorization_prompt(rows: usize) -> String {
    CATEGORIZATION_PROMPT.replace("{rows}", &rows.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorization_prompt_names_row_count() {
        assert!(categorization_prompt(7).starts_with("You are given 7 rows of input"));
    }

    #[test]
    fn extraction_prompt_lists_every_field() {
        for field in crate::models::InsightRecord::FIELDS {
            assert!(EXTRACTION_PROMPT.contains(field), "missing {}", field);
        }
    }
}
