//! Prompt templates and sentinel strings for the three analysis pages.
//!
//! The templates are fixed instructions; the interesting contract is the
//! sentinels, which the router matches against to classify replies.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// System seed placed at the start of every fresh conversation.
pub const SYSTEM_PROMPT: &str = "You are an expert software engineer with decades of experience in understanding and explaining code.";

/// Sentinel the model returns from the explanation prompt when the
/// submitted selection is not code.
pub const MISSING_CODE_SENTINEL: &str = "# MISSING CODE";

/// Bare form of the sentinel used by the complexity prompt.
pub const MISSING_CODE_BARE: &str = "MISSING CODE";

/// Sentinel the model returns when no sorting algorithm was detected.
pub const NO_ALGORITHM_SENTINEL: &str = "default";

/// Closed set of algorithm tokens the detection prompt may return.
pub static ALGORITHM_TOKENS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "bubble",
        "insertion",
        "selection",
        "quick",
        "merge",
        "counting",
        "radix",
        "heap",
        "bucket",
    ]
    .into_iter()
    .collect()
});

/// Instruction for the explanation page.
pub const EXPLANATION_PROMPT: &str = r##"Analyze the highlighted code and provide a concise, detailed explanation.

You MUST follow this response structure:

# Title
## **Code Summary**
- Explain the broader role of the highlighted code within the entire code (3-4 sentences)
- Explain the role of the entire code (that includes the highlighted)
## **Key Concepts**
- Main programming concepts used
## **Line-By-Line**
- Line by line breakdown translating what each line does (MUST use code blocks)

Use markdown formatting. Be direct and technical - no conversational fluff.
Add a space between each bullet point (-).
Consider the wider code as context which you received in a previous chat completion.
If input is not code, respond with ONLY "# MISSING CODE" and nothing else."##;

/// Instruction for the complexity page.
pub const COMPLEXITY_PROMPT: &str = r#"Analyze the complexity of the highlighted code.
You MUST follow this response structure:
# Time Complexity:
| Case         | Complexity |
|--------------|------------|
| Best Case    | O(...)     |
| Average Case | O(...)     |
| Worst Case   | O(...)     |
# Space Complexity:
| Type       | Complexity |
|------------|------------|
| Auxiliary  | O(...)     |
| Total      | O(...)     |
# Performance Factors
- Break down parts of the code (USE CODE BLOCKS) that contribute to the complexity
# Optimization Ideas
- How to improve it

Use markdown formatting. Be technical and concise.
If input is not code, respond with "MISSING CODE"."#;

/// Stage-one visualization instruction: detect the sorting algorithm.
pub const ALGORITHM_PROMPT: &str = r#"Analyze the code and identify if it contains a sorting algorithm.
Respond with ONLY one word from this list: bubble, insertion, selection, quick, merge, counting, radix, heap, bucket
Only the word should be returned. If no sorting algorithm is found, respond with: default"#;

/// Stage-two visualization instruction: extract or synthesize the array.
pub const ARRAY_PROMPT: &str = r#"Analyze the code and identify if it contains an array or any kind of list of values, intended to be sorted.
- If so, extract the array literal from the code.
- If not, generate a dummy array with 5-10 random integers between 1-50.
Respond with ONLY the array values, comma separated, no brackets or extra text."#;

/// True when a reply is the missing-code sentinel in either form.
pub fn is_missing_code(reply: &str) -> bool {
    reply == MISSING_CODE_SENTINEL || reply == MISSING_CODE_BARE
}
