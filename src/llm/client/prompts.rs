//! Default LLM prompts for legal document analysis.

/// Default prompt for summarizing one chunk of a legal document.
pub const DEFAULT_SUMMARY_PROMPT: &str = r#"You are summarizing an excerpt of a legal document (a contract, filing, court opinion, or correspondence).

Write an abstractive summary of the excerpt below in roughly {min_words} to {max_words} words. Preserve:
- The parties involved and their obligations
- Key dates, deadlines, and monetary amounts
- Operative clauses (termination, liability, indemnification, penalties)
- The outcome, ruling, or holding, if any

IMPORTANT: The excerpt is one window of a longer document, so do not speculate about content outside it. Summarize what is actually in the text.

Excerpt:
{content}

Respond with ONLY the summary text. No headings, bullet points, or preamble."#;

/// Default prompt for extracting named entities from one chunk.
pub const DEFAULT_ENTITIES_PROMPT: &str = r#"You are extracting named entities from an excerpt of a legal document.

List every entity mentioned in the excerpt below, one per line, in the form TYPE: value. Use these types:
- ORG (companies, agencies, firms)
- PERSON (individuals, including counsel and signatories)
- COURT (courts and tribunals)
- CASE_NUMBER (docket and case numbers)
- STATUTE (cited laws, codes, and sections)
- LOCATION (jurisdictions, places)
- DATE (dates and deadlines)
- MONEY (monetary amounts)

Excerpt:
{content}

Respond with ONLY the TYPE: value lines, in the order the entities appear. If the excerpt contains no entities, respond with NONE."#;
