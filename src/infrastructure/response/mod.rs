use once_cell::sync::Lazy;
use regex::Regex;

/// `<think>` / `<reasoning>` blocks some models prepend to the answer
static REASONING_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<think>[\s\S]*?</think>|<think\s*/>|<reasoning>[\s\S]*?</reasoning>").unwrap()
});

static FENCE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"```[a-zA-Z]*").unwrap());

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Strips reasoning blocks and code-fence markers from generated text,
/// leaving the body the phase parser reads.
pub fn strip_model_wrapping(response: &str) -> String {
    let without_reasoning = REASONING_BLOCK.replace_all(response, "");
    let without_fences = FENCE_MARKER.replace_all(&without_reasoning, "");
    BLANK_RUN
        .replace_all(without_fences.trim(), "\n\n")
        .into_owned()
}
