use crate::config::Lang;
use crate::error::{Error, Result};
use crate::item::TranslationItem;

use super::traits::ChatPrompt;

/// Identity notes for locales the models tend to under-represent.
const LANGUAGE_GUIDANCE: &[(&str, &str)] = &[
    ("kk", "Kazakh (Қазақша). Write in Cyrillic script with a neutral, modern register."),
    ("la", "Classical Latin. Prefer classical vocabulary and word order; describe modern concepts with Latin phrases."),
    ("qya", "Quenya, the High-elven tongue of Tolkien's legendarium. Follow its inflection and phonology."),
    ("mis-x-dot", "Dothraki, from Game of Thrones, constructed by David J. Peterson."),
    ("tlh", "Klingon (tlhIngan Hol) from Star Trek, constructed by Marc Okrand. Use standard Okrand romanization."),
];

/// Locales that are constructed or fictional languages
const CONSTRUCTED: &[&str] = &["qya", "mis-x-dot", "tlh"];

const CONSTRUCTED_RULES: &str = "For constructed/fictional languages:\n\
- Use your knowledge of their grammar, vocabulary, phonology, and cultural context\n\
- Apply proper word order, inflections, and morphology\n\
- For modern or technical terms without direct equivalents, create naturalistic compounds or loanwords\n\
- Keep the distinctive style and feel of the language";

const OUTPUT_RULES: &str = "You may reason about the translation, but the final output must be ONLY \
a valid JSON array of translated strings, in exactly the same order and with exactly the same \
number of elements as the input array. No explanations, no markdown, no thinking tags.";

pub fn guidance_for(lang: &Lang) -> Option<&'static str> {
    LANGUAGE_GUIDANCE
        .iter()
        .find(|(code, _)| *code == lang.as_str())
        .map(|(_, note)| *note)
}

pub fn is_constructed(lang: &Lang) -> bool {
    CONSTRUCTED.contains(&lang.as_str())
}

/// System instruction naming both locale codes, plus guidance for whichever
/// of them needs it.
pub fn system_instruction(source: &Lang, target: &Lang) -> String {
    let mut prompt = format!(
        "You are a professional translator with expertise in both natural and constructed languages. \
         Translate each string of the JSON array from \"{source}\" to \"{target}\"."
    );

    let notes: Vec<String> = [source, target]
        .into_iter()
        .filter_map(|lang| guidance_for(lang).map(|note| format!("- \"{lang}\" = {note}")))
        .collect();

    if !notes.is_empty() {
        prompt.push_str("\n\nLanguage codes:\n");
        prompt.push_str(&notes.join("\n"));
    }

    if is_constructed(source) || is_constructed(target) {
        prompt.push_str("\n\n");
        prompt.push_str(CONSTRUCTED_RULES);
    }

    prompt.push_str("\n\n");
    prompt.push_str(OUTPUT_RULES);
    prompt
}

/// The batch as one chat request; the user message is the JSON array of source texts.
pub fn build_prompt(items: &[TranslationItem], source: &Lang, target: &Lang) -> Result<ChatPrompt> {
    let texts: Vec<&str> = items.iter().map(|item| item.text.as_str()).collect();
    let user = serde_json::to_string(&texts)
        .map_err(|e| Error::InvalidRequest(format!("batch is not serializable: {e}")))?;

    Ok(ChatPrompt {
        system: system_instruction(source, target),
        user,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainstream_pair_has_no_guidance() {
        let prompt = system_instruction(&Lang::new("en"), &Lang::new("fr"));
        assert!(prompt.contains("from \"en\" to \"fr\""));
        assert!(!prompt.contains("Language codes"));
        assert!(!prompt.contains("constructed/fictional"));
        assert!(prompt.contains("JSON array"));
    }

    #[test]
    fn test_klingon_target_gets_guidance_and_rules() {
        let prompt = system_instruction(&Lang::new("en"), &Lang::new("tlh"));
        assert!(prompt.contains("\"tlh\" = Klingon"));
        assert!(prompt.contains("constructed/fictional"));
    }

    #[test]
    fn test_natural_minority_language_gets_guidance_only() {
        let prompt = system_instruction(&Lang::new("en"), &Lang::new("kk"));
        assert!(prompt.contains("Kazakh"));
        assert!(!prompt.contains("constructed/fictional"));
    }

    #[test]
    fn test_user_message_is_ordered_text_array() {
        let items = vec![
            TranslationItem::new("ui", "a", "Hello"),
            TranslationItem::new("story", "1", "Say \"hi\""),
        ];
        let prompt = build_prompt(&items, &Lang::new("en"), &Lang::new("fr")).unwrap();
        let decoded: Vec<String> = serde_json::from_str(&prompt.user).unwrap();
        assert_eq!(decoded, vec!["Hello", "Say \"hi\""]);
    }
}
