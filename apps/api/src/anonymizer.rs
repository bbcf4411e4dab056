//! Recruiter-facing resume preview with identity stripped out.
//!
//! Two tiers: regex redaction of the raw resume text, and when that does not
//! leave a usable document, a summary synthesised only from public-safe
//! profile fields. `build_preview` is pure and always returns text.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

use crate::models::profile::{PersonalDetails, PublicProfile};

const REDACTED: &str = "[REDACTED]";
const REDACTED_EMAIL: &str = "[REDACTED_EMAIL]";
const REDACTED_PHONE: &str = "[REDACTED_PHONE]";

/// Redacted text at or under this many characters falls back to the summary.
const MIN_PREVIEW_CHARS: usize = 120;
const MIN_PRINTABLE_RATIO: f64 = 0.9;
/// Personal values shorter than this are not redacted verbatim (a one-letter
/// gender marker would otherwise wipe every matching letter).
const MIN_REDACT_LEN: usize = 3;

pub const WITHHELD_NOTICE: &str = "Identity-protected details are hidden until shortlist.";

lazy_static! {
    pub static ref EMAIL_RE: Regex =
        Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").expect("email regex is valid");
    pub static ref PHONE_RE: Regex =
        Regex::new(r"\+?\d[\d\s\-()]{8,}\d").expect("phone regex is valid");
    static ref IDENTITY_LINE_RE: Regex =
        Regex::new(r"(?i)gender|photo|profile picture").expect("identity regex is valid");
    static ref BLANK_RUN_RE: Regex = Regex::new(r"\n{3,}").expect("newline regex is valid");
    static ref SPACE_RUN_RE: Regex = Regex::new(r"[ \t]{2,}").expect("space regex is valid");
}

pub fn build_preview(raw_text: &str, personal: &PersonalDetails, public: &PublicProfile) -> String {
    let redacted = redact(raw_text, personal);
    if is_readable(&redacted) {
        let cleaned = sanitize(&redacted);
        if cleaned.chars().count() > MIN_PREVIEW_CHARS {
            return cleaned;
        }
    }
    synthesize(public)
}

fn redact(text: &str, personal: &PersonalDetails) -> String {
    let mut out = text.to_string();

    for value in [
        &personal.full_name,
        &personal.college,
        &personal.gender,
        &personal.github_link,
        &personal.linkedin_link,
    ] {
        let value = value.trim();
        if value.chars().count() < MIN_REDACT_LEN {
            continue;
        }
        if let Ok(re) = RegexBuilder::new(&regex::escape(value))
            .case_insensitive(true)
            .build()
        {
            out = re.replace_all(&out, REDACTED).into_owned();
        }
    }

    out = EMAIL_RE.replace_all(&out, REDACTED_EMAIL).into_owned();
    out = PHONE_RE.replace_all(&out, REDACTED_PHONE).into_owned();

    out.lines()
        .filter(|line| !IDENTITY_LINE_RE.is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_printable(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || !(c.is_control() || c == char::REPLACEMENT_CHARACTER)
}

fn is_readable(text: &str) -> bool {
    let total = text.chars().count();
    if total == 0 {
        return false;
    }
    let printable = text.chars().filter(|c| is_printable(*c)).count();
    printable as f64 / total as f64 > MIN_PRINTABLE_RATIO
}

fn sanitize(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if is_printable(c) { c } else { ' ' })
        .collect::<String>()
        .replace("\r\n", "\n");
    let collapsed = BLANK_RUN_RE.replace_all(&replaced, "\n\n");
    SPACE_RUN_RE.replace_all(&collapsed, " ").trim().to_string()
}

fn synthesize(public: &PublicProfile) -> String {
    let mut lines = vec!["Bias-Free Candidate Profile".to_string(), String::new()];
    if !public.tagline.trim().is_empty() {
        lines.push(format!("Tagline: {}", public.tagline.trim()));
    }
    if public.experience_years > 0 {
        lines.push(format!("Experience: {} years", public.experience_years));
    }
    if !public.city.trim().is_empty() {
        lines.push(format!("Location: {}", public.city.trim()));
    }
    if !public.skills.is_empty() {
        lines.push(format!("Skills: {}", public.skills.join(", ")));
    }
    lines.push(String::new());
    lines.push(WITHHELD_NOTICE.to_string());
    sanitize(&lines.join("\n"))
}
