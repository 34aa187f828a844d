//! Prompt assembly for outreach generation.

use leadloop_core::OutreachContext;

const DEFAULT_PERSONA: &str = "You write short, warm outreach copy for a LinkedIn \
    lead-generation campaign. Match the language of the commenter.";

/// System prompt: persona plus the required output contract.
pub(crate) fn system_prompt(context: &OutreachContext) -> String {
    let persona = context
        .persona_prompt
        .as_deref()
        .unwrap_or(DEFAULT_PERSONA);
    format!(
        "{persona}\n\n\
         Respond with a single JSON object and nothing else, with exactly two \
         string fields: \"reply\" (a public comment reply, at most 280 \
         characters) and \"dm\" (a direct message, at most 800 characters)."
    )
}

/// User prompt: everything the model needs about this specific lead.
pub(crate) fn user_prompt(context: &OutreachContext) -> String {
    let mut prompt = format!(
        "Campaign: {}\nCommenter name: {}\nTheir comment: {}\n",
        context.campaign_name, context.lead_name, context.comment_text
    );
    if let Some(post_text) = &context.post_text {
        prompt.push_str(&format!("Post they commented on: {post_text}\n"));
    }
    if let Some(lead_magnet) = &context.lead_magnet {
        prompt.push_str(&format!(
            "The DM must deliver this resource: {lead_magnet}\n"
        ));
    }
    if let Some(template) = &context.reply_template {
        prompt.push_str(&format!("Base the reply on this template: {template}\n"));
    }
    if let Some(template) = &context.dm_template {
        prompt.push_str(&format!("Base the DM on this template: {template}\n"));
    }
    prompt
}

/// Strip a Markdown code fence if the model wrapped its JSON in one.
pub(crate) fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> OutreachContext {
        OutreachContext {
            campaign_name: "Guia SEO".to_string(),
            post_text: Some("Lancei um guia de SEO".to_string()),
            comment_text: "Quero o guia!".to_string(),
            lead_name: "Ana".to_string(),
            persona_prompt: None,
            reply_template: None,
            dm_template: Some("Oi {name}, segue o link".to_string()),
            lead_magnet: Some("https://example.com/guia".to_string()),
        }
    }

    #[test]
    fn system_prompt_uses_campaign_persona_when_present() {
        let mut ctx = context();
        ctx.persona_prompt = Some("Fale como um especialista em SEO.".to_string());
        let prompt = system_prompt(&ctx);
        assert!(prompt.starts_with("Fale como um especialista em SEO."));
        assert!(prompt.contains("\"reply\""));
        assert!(prompt.contains("\"dm\""));
    }

    #[test]
    fn user_prompt_includes_optional_fields_only_when_set() {
        let prompt = user_prompt(&context());
        assert!(prompt.contains("Commenter name: Ana"));
        assert!(prompt.contains("https://example.com/guia"));
        assert!(prompt.contains("segue o link"));
        assert!(!prompt.contains("reply on this template"));
    }

    #[test]
    fn code_fences_are_stripped() {
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }
}
