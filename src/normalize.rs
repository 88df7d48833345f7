use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::models::{CanonicalEvent, RawRecord};
use crate::slug;

pub const NAME_FALLBACK: &str = "Evento sem nome";
pub const DATE_FALLBACK: &str = "Data a confirmar";

// Alias chains, in priority order. The accessor is case-insensitive but
// does no diacritic folding, so unaccented spellings are aliases of their
// own.
const NAME_ALIASES: &[&str] = &["Evento", "Nome"];
const DATE_ALIASES: &[&str] = &["Data", "Date"];
const LOCATION_ALIASES: &[&str] = &["Local"];
const START_ALIASES: &[&str] = &["Início", "Inicio"];
const END_ALIASES: &[&str] = &["Fim"];
const ATTRACTIONS_ALIASES: &[&str] = &["Atrações", "Atracoes"];
const PRODUCER_ALIASES: &[&str] = &["Produtora", "Produtor"];
const IMAGE_ALIASES: &[&str] = &["Imagem (URL)", "Imagem"];
const GENRES_ALIASES: &[&str] = &["Gêneros", "Generos", "Gênero", "Genero"];
const TICKET_ALIASES: &[&str] = &["Ingressos (URL)", "Ingressos"];
const INSTAGRAM_ALIASES: &[&str] = &["Instagram (URL)", "Instagram"];
const COUPON_ALIASES: &[&str] = &["Cupom", "Cupom (Desconto)"];
const HIDDEN_FIELD: &str = "Oculto";

/// Built-in name→asset overrides for events whose sheet image is replaced
/// by a local file. Data, not logic: the table lives in a bundled JSON
/// resource and duplicate keys resolve to the last definition.
static IMAGE_OVERRIDES: Lazy<HashMap<String, String>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../assets/image_overrides.json"))
        .expect("bundled image override table")
});

/// Map raw sheet records into canonical events, dropping hidden rows.
///
/// Total over its input: a record missing required fields falls back to a
/// placeholder, never an error, and the input sequence is left untouched.
pub fn normalize(records: &[RawRecord]) -> Vec<CanonicalEvent> {
    normalize_with_overrides(records, &HashMap::new())
}

/// Like [`normalize`], with extra name→asset overrides (from configuration)
/// taking precedence over the bundled table.
pub fn normalize_with_overrides(
    records: &[RawRecord],
    extra_overrides: &HashMap<String, String>,
) -> Vec<CanonicalEvent> {
    records
        .iter()
        .filter(|record| !is_hidden(record))
        .map(|record| map_record(record, extra_overrides))
        .collect()
}

/// A row is hidden when the sheet's "Oculto" cell says so.
pub fn is_hidden(record: &RawRecord) -> bool {
    record
        .get(HIDDEN_FIELD)
        .map(|value| {
            let value = value.to_lowercase();
            value == "sim" || value == "true"
        })
        .unwrap_or(false)
}

/// Resolve one raw record into a canonical event.
pub fn map_record(record: &RawRecord, extra_overrides: &HashMap<String, String>) -> CanonicalEvent {
    let name = record
        .get_any(NAME_ALIASES)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(NAME_FALLBACK)
        .to_string();

    let date = record
        .get_any(DATE_ALIASES)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DATE_FALLBACK)
        .to_string();

    let mut image_url = field(record, IMAGE_ALIASES);
    let override_key = name.trim().to_lowercase();
    if let Some(asset) = extra_overrides
        .get(&override_key)
        .or_else(|| IMAGE_OVERRIDES.get(&override_key))
    {
        image_url = Some(asset.clone());
    }

    let slug = slug::slugify(&name);

    CanonicalEvent {
        name,
        date,
        location: field(record, LOCATION_ALIASES),
        start_time: field(record, START_ALIASES),
        end_time: field(record, END_ALIASES),
        attractions: field(record, ATTRACTIONS_ALIASES),
        producer: field(record, PRODUCER_ALIASES),
        image_url,
        genres: field(record, GENRES_ALIASES),
        ticket_info: field(record, TICKET_ALIASES),
        instagram_url: field(record, INSTAGRAM_ALIASES),
        coupon: field(record, COUPON_ALIASES),
        hidden: is_hidden(record),
        slug,
    }
}

fn field(record: &RawRecord, aliases: &[&str]) -> Option<String> {
    record
        .get_any(aliases)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv;

    const SAMPLE_CSV: &str = "\
Evento,Data,Local,Oculto
\"Festa, Edição 2\",01/03/2026,\"Praia, Centro\",não
Secreta,05/03/2026,Bunker,sim
";

    #[test]
    fn hidden_rows_are_dropped_and_fields_resolved() {
        let events = normalize(&csv::parse(SAMPLE_CSV));
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.name, "Festa, Edição 2");
        assert_eq!(event.date, "01/03/2026");
        assert_eq!(event.location.as_deref(), Some("Praia, Centro"));
        assert_eq!(event.slug, "festa-edicao-2");
        assert!(!event.hidden);
    }

    #[test]
    fn oculto_accepts_sim_and_true_in_any_case() {
        let events = normalize(&csv::parse(
            "Evento,Oculto\nA,SIM\nB,True\nC,não\nD,\n",
        ));
        let names: Vec<&str> = events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["C", "D"]);
    }

    #[test]
    fn missing_name_and_date_fall_back_to_placeholders() {
        let events = normalize(&csv::parse("Local\nBunker\n"));
        assert_eq!(events[0].name, NAME_FALLBACK);
        assert_eq!(events[0].date, DATE_FALLBACK);
        assert_eq!(events[0].slug, crate::slug::FALLBACK_SLUG);
    }

    #[test]
    fn nome_is_an_alias_for_evento() {
        let events = normalize(&csv::parse("Nome,Data\nBeije,01/01/2026\n"));
        assert_eq!(events[0].name, "Beije");
    }

    #[test]
    fn builtin_image_override_matches_name_case_insensitively() {
        let events = normalize(&csv::parse(
            "Evento,Imagem (URL)\nNA PISTA,https://example.com/sheet.png\n",
        ));
        assert_eq!(events[0].image_url.as_deref(), Some("./assets/napista.PNG"));
    }

    #[test]
    fn override_is_exact_match_only() {
        let events = normalize(&csv::parse(
            "Evento,Imagem (URL)\nNa Pista do Verão,https://example.com/sheet.png\n",
        ));
        assert_eq!(
            events[0].image_url.as_deref(),
            Some("https://example.com/sheet.png")
        );
    }

    #[test]
    fn configured_overrides_win_over_builtin_ones() {
        let mut extra = HashMap::new();
        extra.insert("na pista".to_string(), "./assets/custom.png".to_string());
        let events =
            normalize_with_overrides(&csv::parse("Evento\nNa Pista\n"), &extra);
        assert_eq!(events[0].image_url.as_deref(), Some("./assets/custom.png"));
    }

    #[test]
    fn normalization_is_idempotent_over_the_same_text() {
        let first = normalize(&csv::parse(SAMPLE_CSV));
        let second = normalize(&csv::parse(SAMPLE_CSV));
        assert_eq!(first, second);
    }

    #[test]
    fn input_records_are_not_mutated() {
        let records = csv::parse(SAMPLE_CSV);
        let before = records.clone();
        let _ = normalize(&records);
        assert_eq!(records, before);
    }
}
