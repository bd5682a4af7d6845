//! LLM prompt templates.
//!
//! Templates are opaque data, not code: each [`TemplateKind`] maps to a
//! fixed template text with `{placeholder}` slots, and the `format_*`
//! helpers fill them. The table-structuring template carries worked
//! header-folding examples; they are part of the output contract and must
//! not be edited casually.

use sha2::{Digest, Sha256};

/// The prompt templates known to the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// Full-paper metadata extraction with the fixed key list.
    MetaExtract,
    /// Per-page table presence judgment + verbatim region extraction.
    TableDetect,
    /// Raw table region to structured CSV.
    TableStructure,
    /// Figure description from caption + image.
    FigureDescribe,
    /// Evidence-grounded question answering.
    Answer,
    /// Multi-paper title+abstract synthesis.
    Summarize,
    /// Answer-relevancy judging.
    RelevancyJudge,
}

/// Look up the raw template text for a kind.
pub fn template(kind: TemplateKind) -> &'static str {
    match kind {
        TemplateKind::MetaExtract => META_EXTRACT_TEMPLATE,
        TemplateKind::TableDetect => TABLE_DETECT_TEMPLATE,
        TemplateKind::TableStructure => TABLE_STRUCTURE_TEMPLATE,
        TemplateKind::FigureDescribe => FIGURE_DESCRIBE_TEMPLATE,
        TemplateKind::Answer => ANSWER_TEMPLATE,
        TemplateKind::Summarize => SUMMARIZE_TEMPLATE,
        TemplateKind::RelevancyJudge => RELEVANCY_JUDGE_TEMPLATE,
    }
}

/// Hash of a template, for cache-invalidation stamps.
pub fn template_hash(kind: TemplateKind) -> String {
    let mut hasher = Sha256::new();
    hasher.update(template(kind).as_bytes());
    format!("{:x}", hasher.finalize())
}

const META_EXTRACT_TEMPLATE: &str = r#"You should extract the meta information of the given paper.
This is the paper content: {paper}

The information you need to extract includes the following keys: "Title", "Abstract", "Year", "Author", "Journal/Conference", "ISSN", "Volume", "Issue", "Page", "DOI", "Link", "Publisher", "Language".
For the page, please use the format like "12-15", "134-145". If there is only one page, the format can be "145", "1345".
When there is no such information for a key, return "none" as the value of that key, but make sure the information is truly absent. Try your best to retrieve the information and reduce the occurrence of "none".

Respond with a single JSON object containing exactly those keys and string values. Do not output anything else."#;

const TABLE_DETECT_TEMPLATE: &str = r#"I will give you a page of a pdf file.
You need first to judge whether there is any table in the page content.
Then you need to extract the original information of the table from the page content.
The following is the page content: {page_content}

If yes, just tell me the answer through the JSON format which includes the following keys: table_name and table_content. Store all the json in a list through "[ ]". Besides, table_name is the Table order, such as Table 1, Table 2, Table 3...
Note that you should tell me the related region of this table (raw data) from the page content without any processing in the table_content.
Besides, you shouldn't output any other things (such as 'yes' or many explanations). That means, you just need to tell me the final output in JSON format in your response.

If no, just tell me "no"."#;

const TABLE_STRUCTURE_TEMPLATE: &str = r#"I will give you a table content. You need to organize it in a CSV format.

This is the step: (1) You should determine the column names. (2) You should fill all the data in the corresponding column and row.

There are some points you should pay attention to:
(1) Don't leave out any of the information I gave you, you should organize all my information into a table for me.
(2) Be careful with '\n'. If \n exists, there are two kinds of scenarios. First of all, it may be too long resulting in a wrap, in which case the front and back are actually one and the same. If you find that \n before and after can not form a whole, that is a nested table: the front column name is the parent column name of the back column names. At this time, you should add parent column names. Here are a few different examples:
a. example1: For the column name message "Tempo de estocagem (dias)\n 0 55 90 145 180 235 280 360", there is an \n after Tempo de estocagem (dias), so the column names 0 55 90 145 180 235 280 360 are sub-columns of Tempo de estocagem (dias). At this point you need to organize into:
Tempo de estocagem (dias), Tempo de estocagem (dias), Tempo de estocagem (dias), Tempo de estocagem (dias), Tempo de estocagem (dias), Tempo de estocagem (dias), Tempo de estocagem (dias), Tempo de estocagem (dias)
0, 55, 90, 145, 180, 235, 280, 360
These are the column names at the previous level and column names at the next level, respectively.
Another example of this:
input: All-trans-b-caroteneb(mg/g DM) 13-cis-b-carotene Retention of\nall-trans -b-carotene (%)d\n(mg/g DM)c(% of total b-carotene):
thoughts: Retention of \nall-trans -b-carotene (%) can be thought of as a wrap instead of two columns. \n(mg/g DM)c (% of total b-carotene) is a sub-column, and since 13-cis-b-carotene has no units, (mg/g DM)c and (% of total b-carotene) should be sub-columns of 13-cis-b-carotene. So the final column names should be organized as:
output: All-trans-b-caroteneb (mg/g DM), 13-cis-b-carotene (mg/g DM)c, 13-cis-b-carotene (% of total b-carotene), Retention of all-trans-b-carotene (%)d
b. example2: Sometimes the line breaks don't necessarily represent a relationship between the column name and a subcolumn name, such as the following: TPO2 a 23 °C, 1 atm(1) \n (mL (CNTP).m-2.dia-1). It may just be that the data is too long to fit a unit. This time TPO2 a 23 °C, 1 atm(1) (mL (CNTP).m-2.dia-1) is one unit.
(3) Note some of the special symbols such as ±.
(4) You need to ignore some special symbols, such as unicode code point representations (e.g., /uni0394, /uni00A0).
(5) You should use "" to wrap every cell.
(6) Since you are outputting csv data, each row of your output should have the same number of elements. For blanks you use "" instead.
(7) Sometimes there will be redundant spaces, and you need to deal with those depending on the context. For example, there may be many spaces in "16   ± 0.6" due to noise, but it actually represents "16 ± 0.6".
This is the content of my table: {table_information}

Tell me the answer in JSON format, including keys "table_caption" and "table_content", where "table_content" is a string in CSV format."#;

const FIGURE_DESCRIBE_TEMPLATE: &str = r#"I will give you a figure in a paper. Besides, I will also give you the caption of this figure.
You should describe the data insight in this figure based on the caption.
The more detailed the description, the better.
This is the caption: {caption}."#;

const ANSWER_TEMPLATE: &str = r#"You are answering a question about a set of research papers.
You are given evidence retrieved from those papers: text passages, tables in CSV format, and figure descriptions. Each evidence block is labeled with its source paper.

Answer the question using ONLY the evidence below. If the evidence does not contain the answer, say that you cannot find the answer in the selected papers; never invent numbers or facts.

Evidence:
{evidence}

Question: {question}

Respond with a single JSON object with exactly two keys:
"summary": a short synthesis of what the retrieved evidence covers,
"answer": the grounded answer to the question.
Do not output anything else."#;

const SUMMARIZE_TEMPLATE: &str = r#"You are given the titles and abstracts of several research papers.
Write a concise synthesis of this collection: the shared topic, the main approaches, and what distinguishes the papers from each other.

Papers:
{documents}"#;

const RELEVANCY_JUDGE_TEMPLATE: &str = r#"You are grading how relevant an answer is to a question.
Judge only relevancy: does the answer address what was asked? Ignore whether it is factually correct.

Question: {question}
Answer: {answer}

Respond with a single JSON object: {"score": <a number between 0.0 and 1.0>}. Do not output anything else."#;

/// Format the metadata extraction prompt.
pub fn format_meta_extract(paper: &str) -> String {
    template(TemplateKind::MetaExtract).replace("{paper}", paper)
}

/// Format the per-page table detection prompt.
pub fn format_table_detect(page_content: &str) -> String {
    template(TemplateKind::TableDetect).replace("{page_content}", page_content)
}

/// Format the table structuring prompt.
pub fn format_table_structure(table_information: &str) -> String {
    template(TemplateKind::TableStructure).replace("{table_information}", table_information)
}

/// Format the figure description prompt.
pub fn format_figure_describe(caption: &str) -> String {
    template(TemplateKind::FigureDescribe).replace("{caption}", caption)
}

/// Format the grounded answer prompt.
pub fn format_answer(question: &str, evidence: &str) -> String {
    template(TemplateKind::Answer)
        .replace("{evidence}", evidence)
        .replace("{question}", question)
}

/// Format the multi-paper summarize prompt.
pub fn format_summarize(documents: &str) -> String {
    template(TemplateKind::Summarize).replace("{documents}", documents)
}

/// Format the answer-relevancy judging prompt.
pub fn format_relevancy_judge(question: &str, answer: &str) -> String {
    template(TemplateKind::RelevancyJudge)
        .replace("{question}", question)
        .replace("{answer}", answer)
}

/// Appended when a model reply failed to parse and one retry is allowed.
pub const REPAIR_SUFFIX: &str =
    "\n\nYour previous reply was not valid JSON in the requested shape. Reply again with only the requested JSON object.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_hash_is_stable() {
        let first = template_hash(TemplateKind::TableStructure);
        let second = template_hash(TemplateKind::TableStructure);
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_format_fills_placeholders() {
        let prompt = format_table_detect("page body here");
        assert!(prompt.contains("page body here"));
        assert!(!prompt.contains("{page_content}"));

        let prompt = format_answer("What is the yield?", "[1] passage");
        assert!(prompt.contains("What is the yield?"));
        assert!(prompt.contains("[1] passage"));
    }

    #[test]
    fn test_meta_template_lists_every_key() {
        let text = template(TemplateKind::MetaExtract);
        for key in crate::types::meta::META_KEYS {
            assert!(text.contains(key), "template missing key {key}");
        }
    }
}
