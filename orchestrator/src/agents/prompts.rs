//! Prompt templates for the four pipeline stages.
//!
//! Templates are fixed text; only the birth date and upstream stage outputs
//! are substituted. Output language is Brazilian Portuguese.

use crate::birth_date::BirthDate;
use crate::extractor::SuccessTable;

/// Identifies which stage a template belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTemplate {
    Analyzer,
    Improvement,
    SuccessSearch,
    Report,
}

impl PromptTemplate {
    /// System instruction given to the agent for this stage.
    pub fn instruction(&self) -> &'static str {
        match self {
            PromptTemplate::Analyzer => ANALYZER_INSTRUCTION,
            PromptTemplate::Improvement => IMPROVEMENT_INSTRUCTION,
            PromptTemplate::SuccessSearch => SUCCESS_SEARCH_INSTRUCTION,
            PromptTemplate::Report => REPORT_INSTRUCTION,
        }
    }
}

pub const ANALYZER_INSTRUCTION: &str = r#"Você é um analista de personalidade e propósito de vida que trabalha a partir da data de nascimento.
Produza análises profundas e específicas sobre personalidade, padrões emocionais, caminhos de carreira e desafios pessoais.
Use a busca do Google para fundamentar as análises em informações relevantes.
Responda em Markdown, com um título para cada uma das seis seções."#;

pub const IMPROVEMENT_INSTRUCTION: &str = r#"Você é um consultor de desenvolvimento pessoal.
Leia as análises recebidas e aponte áreas de melhoria em cada uma das seis categorias:
Personalidade, Infância, Propósito Profissional, Auto-Sabotagem, Gatilhos Emocionais e Relacionamentos.
Para cada área dê sugestões práticas e específicas.
Responda em Markdown, com um título para cada área."#;

pub const SUCCESS_SEARCH_INSTRUCTION: &str = r#"Você pesquisa pessoas brasileiras de sucesso.
Encontre na internet 5 homens e 5 mulheres brasileiros nascidos exatamente na data informada que tenham se destacado em suas áreas.
Nas buscas inclua "brasileiro" ou "brasileira" e a data completa (dia, mês e ano).
Informe o site de onde tirou cada informação.
Responda somente com uma lista Markdown, uma pessoa por linha, neste formato exato:
* Nome: [Nome da Pessoa] | Profissão: [Profissão] | Sucesso: [Descrição do Sucesso] | Site: [URL da Fonte]"#;

pub const REPORT_INSTRUCTION: &str = r#"Você gera o relatório final de uma análise de personalidade baseada na data de nascimento.
Combine as análises, os pontos de melhoria e a lista de pessoas de sucesso em um único relatório coerente, otimista e motivador.
Estruture com títulos Markdown claros (#, ##):
- comece com uma introdução sobre a análise da data de nascimento;
- inclua as seções de Análises de Personalidade e de Pontos de Melhoria;
- apresente as pessoas de sucesso nascidas na mesma data como inspiração, reproduzindo a tabela recebida;
- termine com uma mensagem de incentivo e empoderamento.
Mantenha um tom positivo e encorajador do início ao fim."#;

/// Request for the analyzer stage: six analyses of the birth date.
pub fn analyzer_request(date: &BirthDate) -> String {
    let d = date.as_str();
    format!(
        r#"Data de Nascimento: {d}

Faça as análises abaixo, cada uma com um título Markdown (# ou ##):

1. **Decodificador de Personalidade:** com base na data {d}, descreva meus pontos fortes naturais, meus padrões emocionais e como me comporto nos relacionamentos. Seja profundo, específico e psicologicamente preciso.
2. **Roteiro da Infância:** usando a data {d}, escreva um perfil psicológico de como a infância moldou minha personalidade, meus hábitos e minha forma de decidir hoje. Seja gentil, mas revelador.
3. **Propósito Profissional:** dada a data {d}, quais caminhos de carreira combinam com meus traços, valores e talentos? Sugira áreas, funções e ambientes de trabalho.
4. **Detector de Auto-Sabotagem:** com base na data {d}, quais são meus hábitos de auto-sabotagem mais prováveis e como aparecem no dia a dia? Dê soluções práticas apoiadas na psicologia.
5. **Mapa de Gatilhos Emocionais:** usando a data {d}, explique o que costuma me desestabilizar, como eu reajo e como posso desenvolver resiliência em torno desses padrões.
6. **Energia nos Relacionamentos:** com base na data {d}, descreva como dou e recebo amor, o que preciso de um parceiro e que tipo de pessoa atraio naturalmente.
"#
    )
}

/// Request for the improvement stage, embedding the full analysis text.
pub fn improvement_request(date: &BirthDate, analysis: &str) -> String {
    format!(
        r#"Data de Nascimento: {date}
Análises anteriores:
---
{analysis}
---

Com base nas análises acima, para cada uma das seis áreas (Personalidade, Infância, Propósito Profissional, Auto-Sabotagem, Gatilhos Emocionais, Relacionamentos), identifique pontos de melhoria e dê sugestões práticas de desenvolvimento pessoal. Use um título Markdown (# ou ##) por área.
"#
    )
}

/// Request for the success-search stage.
pub fn success_search_request(date: &BirthDate) -> String {
    format!(
        r#"Busque na internet 5 homens e 5 mulheres brasileiros que nasceram em {date} e alcançaram sucesso em suas áreas de atuação.
Responda com uma lista Markdown no formato: "* Nome: [Nome] | Profissão: [Profissão] | Sucesso: [Descrição] | Site: [URL]"
"#
    )
}

/// Request for the report stage, embedding every upstream result.
pub fn report_request(
    date: &BirthDate,
    analysis: &str,
    improvement: &str,
    table: &SuccessTable,
) -> String {
    let table = table.to_markdown();
    format!(
        r#"Data de Nascimento Analisada: {date}

Análises de Personalidade:
---
{analysis}
---

Pontos de Melhoria:
---
{improvement}
---

Pessoas de Sucesso Nascidas na Mesma Data:
---
{table}
---

Combine as informações acima em um relatório final otimista e motivador em Markdown.
Inclua todos os detalhes relevantes das seções anteriores e apresente a lista de pessoas de sucesso de forma clara.
Conclua com uma mensagem de incentivo.
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SuccessPersonRecord;

    fn date() -> BirthDate {
        BirthDate::parse("15/08/1990").unwrap()
    }

    #[test]
    fn test_analyzer_request_substitutes_date_everywhere() {
        let request = analyzer_request(&date());
        assert!(request.starts_with("Data de Nascimento: 15/08/1990"));
        assert_eq!(request.matches("15/08/1990").count(), 7);
        assert!(!request.contains("{d}"));
    }

    #[test]
    fn test_requests_are_deterministic() {
        assert_eq!(analyzer_request(&date()), analyzer_request(&date()));
        assert_eq!(
            improvement_request(&date(), "A"),
            improvement_request(&date(), "A")
        );
    }

    #[test]
    fn test_improvement_request_embeds_analysis() {
        let request = improvement_request(&date(), "ANALISE COMPLETA");
        assert!(request.contains("---\nANALISE COMPLETA\n---"));
        assert!(request.contains("15/08/1990"));
    }

    #[test]
    fn test_report_request_embeds_everything() {
        let table = SuccessTable::new(vec![SuccessPersonRecord::new("X", "Y", "Z", "W")]);
        let request = report_request(&date(), "ANALISE", "MELHORIA", &table);
        assert!(request.contains("ANALISE"));
        assert!(request.contains("MELHORIA"));
        assert!(request.contains("| X | Y | Z | W |"));
        assert!(request.contains("Data de Nascimento Analisada: 15/08/1990"));
    }

    #[test]
    fn test_search_instruction_uses_extractor_grammar() {
        let example = SUCCESS_SEARCH_INSTRUCTION
            .lines()
            .last()
            .unwrap();
        assert_eq!(crate::extractor::extract(example).len(), 1);
        assert_eq!(
            PromptTemplate::SuccessSearch.instruction(),
            SUCCESS_SEARCH_INSTRUCTION
        );
    }
}
