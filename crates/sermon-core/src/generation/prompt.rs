//! Prompt text sent to the model

use crate::models::SermonOutline;

/// Shape the model must answer with
const OUTLINE_SCHEMA: &str = r#"{
  "title": string,
  "theme_and_subtitle": string,
  "context": { "title": string, "content": string },
  "introduction": { "title": string, "hook": string },
  "development": [
    {
      "point": integer,
      "title": string,
      "icon": "TentIcon" | "BuildingIcon" | "DoveIcon",
      "argument": string,
      "subsections": [ { "title": string, "content": string } ],
      "application": string
    }
  ],
  "conclusion": {
    "title": string,
    "recap": string,
    "appealToBelievers": string,
    "appealToUnbelievers": string
  }
}"#;

/// Cut `text` to at most `max_chars` characters
///
/// Counts chars, so the cut never splits a UTF-8 sequence.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Request for a full outline of `passage`
pub fn outline_prompt(passage: &str, supporting_text: Option<&str>) -> String {
    let mut prompt = format!(
        "Você é um assistente de homilética. Prepare o esboço de um sermão expositivo \
         sobre a passagem bíblica \"{passage}\".\n\n\
         Regras:\n\
         - Escreva todo o conteúdo em português.\n\
         - Use de 2 a 4 pontos de desenvolvimento, numerados a partir de 1.\n\
         - Escolha para cada ponto um ícone entre TentIcon, BuildingIcon e DoveIcon.\n\
         - Destaque frases importantes com **negrito** usando pares de asteriscos.\n\
         - Use linhas começando com \"- \" para listas.\n\
         - Responda somente com JSON válido no formato abaixo, sem texto adicional.\n\n\
         {OUTLINE_SCHEMA}\n"
    );

    if let Some(text) = supporting_text.map(str::trim).filter(|t| !t.is_empty()) {
        prompt.push_str(
            "\nUse o material de apoio a seguir como referência, sem copiá-lo literalmente:\n\
             <<<\n",
        );
        prompt.push_str(text);
        prompt.push_str("\n>>>\n");
    }

    prompt
}

/// Request for the presentation rewrite of `outline`
pub fn presentation_prompt(outline: &SermonOutline) -> serde_json::Result<String> {
    let source = serde_json::to_string_pretty(outline)?;
    Ok(format!(
        "Reescreva o esboço de sermão abaixo para o modo de apresentação.\n\n\
         Regras:\n\
         - Mantenha exatamente a mesma estrutura JSON, as mesmas chaves e os mesmos ícones.\n\
         - Transforme cada campo de texto longo em frases curtas e assertivas, \
         uma por linha, separadas por \\n.\n\
         - Preserve os destaques em **negrito**.\n\
         - Não altere títulos nem números dos pontos.\n\
         - Responda somente com JSON válido, sem texto adicional.\n\n\
         {source}\n"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::sample_outline;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("ação", 2), "aç");
        assert_eq!(truncate_chars("", 5), "");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_outline_prompt() {
        let prompt = outline_prompt("João 3:16", None);
        assert!(prompt.contains("\"João 3:16\""));
        assert!(prompt.contains("\"theme_and_subtitle\""));
        assert!(!prompt.contains("material de apoio"));

        let prompt = outline_prompt("João 3:16", Some("  comentário  "));
        assert!(prompt.contains("material de apoio"));
        assert!(prompt.contains("<<<\ncomentário\n>>>"));

        assert!(!outline_prompt("Sl 1", Some("   ")).contains("material de apoio"));
    }

    #[test]
    fn test_presentation_prompt_embeds_outline() {
        let prompt = presentation_prompt(&sample_outline()).unwrap();
        assert!(prompt.contains("A Tenda do Encontro"));
        assert!(prompt.contains("\"appealToBelievers\""));
    }
}
