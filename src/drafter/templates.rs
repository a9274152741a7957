//! Fixed reply templates and phrase tables

use crate::types::KbArticle;

/// Recognised opening words
pub const GREETINGS: [&str; 3] = ["Hello", "Hi", "Dear"];
/// Recognised sign-off phrases
pub const SIGN_OFFS: [&str; 2] = ["Best regards", "Sincerely"];
pub const SIGNATURE: &str = "Customer Support Team";

/// Words that trigger the urgent acknowledgment
pub const URGENCY_WORDS: [&str; 5] = ["urgent", "critical", "immediately", "asap", "emergency"];

/// Reply used when no KB article was retrieved
pub const NO_ARTICLE_REPLY: &str = "Hello,

Thank you for contacting our support team. We've received your inquiry and are reviewing it carefully.

Our team will respond within 24 hours with detailed assistance tailored to your specific needs.

Please don't hesitate to reply if you have any additional questions in the meantime.

Best regards,
Customer Support Team";

/// Citation token for an article id
pub fn citation_token(article_id: &str) -> String {
    format!("[Article #{}]", article_id)
}

/// Canonical closing: citation line, sign-off, signature
pub fn closing_block(article_id: &str) -> Vec<String> {
    vec![
        String::new(),
        format!(
            "This information is based on {}. Please reply if you need further assistance!",
            citation_token(article_id)
        ),
        String::new(),
        format!("{},", SIGN_OFFS[0]),
        SIGNATURE.to_string(),
    ]
}

pub fn is_urgent(text: &str) -> bool {
    let lowered = text.to_lowercase();
    URGENCY_WORDS.iter().any(|word| lowered.contains(word))
}

/// Deterministic reply grounded on the top-ranked article
pub fn heuristic_reply(text: &str, top: &KbArticle) -> String {
    let acknowledgment = if is_urgent(text) {
        "Thank you for contacting our support team regarding your urgent request."
    } else {
        "Thank you for contacting our support team."
    };

    let mut lines = vec![
        "Hello,".to_string(),
        String::new(),
        acknowledgment.to_string(),
        String::new(),
        "Based on our knowledge base, here are the steps to resolve your issue:".to_string(),
        String::new(),
        "1. **Log into your account** using your credentials".to_string(),
        "2. **Navigate to the appropriate section** as described in the documentation".to_string(),
        "3. **Follow the step-by-step instructions** provided in the guide".to_string(),
        "4. **Verify the changes** have been applied successfully".to_string(),
        "5. **Contact our support team** if you encounter any difficulties".to_string(),
        String::new(),
        format!(
            "Note: These steps are based on our {} documentation.",
            top.title.trim().to_lowercase()
        ),
    ];
    lines.extend(closing_block(&top.id));
    lines.join("\n")
}

/// Reply used when the model call fails
pub fn fallback_reply(top: &KbArticle) -> String {
    let mut lines = vec![
        "Hello,".to_string(),
        String::new(),
        "Thank you for contacting our support team regarding your inquiry.".to_string(),
        String::new(),
        format!("Based on {}, here are the recommended steps:", top.title.trim()),
        String::new(),
        "1. **Review the relevant documentation** in your account settings".to_string(),
        "2. **Follow the step-by-step process** as outlined in our guide".to_string(),
        "3. **Verify each step** is completed successfully before proceeding".to_string(),
        "4. **Contact our support team** if you encounter any issues during the process".to_string(),
        String::new(),
        "Note: These instructions are based on our standard resolution procedures.".to_string(),
    ];
    lines.extend(closing_block(&top.id));
    lines.join("\n")
}
