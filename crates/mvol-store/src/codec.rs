//! Market-line codec.
//!
//! One market per line, sections separated by `|`:
//!
//! ```text
//! <name>: Standard Deviation of: Vacancy: <v>, Rent Growth: <v>, Cap Rate: <v> | Coefficient of variation of: ... | Beta compared to the national index of: ... | Ten Year Vacancy: [<v>, ...] | Ten Year Rent Growth: [...] | Ten Year Cap Rate: [...] |
//! ```
//!
//! The first three sections hold the scalar triples; the section position
//! decides the statistic and the per-metric labels may come in any order.
//! Sequence sections are recognised by their `Ten Year <Metric>:` label.
//! Decoding fails closed: a missing field or a bad number rejects the line.

use mvol_core::{format_series, format_value, parse_value, MarketRecord, Metric, MetricStats, Statistic};

/// Section headers of the three scalar slots, in slot order.
const SCALAR_SLOTS: [(Statistic, &str); 3] = [
    (Statistic::StdDev, "Standard Deviation of"),
    (Statistic::Cv, "Coefficient of variation of"),
    (Statistic::Beta, "Beta compared to the national index of"),
];

/// The leading name token of a market line: the text before the first `:`,
/// trimmed. `None` for lines without a usable name.
pub fn name_token(line: &str) -> Option<&str> {
    let (name, _) = line.split_once(':')?;
    let name = name.trim();
    (!name.is_empty()).then_some(name)
}

/// Serialize a record to its single-line form.
pub fn encode_market_line(record: &MarketRecord) -> String {
    let mut line = format!("{}: ", record.name);

    for (statistic, header) in SCALAR_SLOTS {
        let values: Vec<String> = Metric::ALL
            .iter()
            .map(|m| format!("{}: {}", m.label(), format_value(record.family(*m).statistic(statistic))))
            .collect();
        line.push_str(&format!("{header}: {} | ", values.join(", ")));
    }

    for metric in Metric::ALL {
        line.push_str(&format!(
            "Ten Year {}: {} | ",
            metric.label(),
            format_series(&record.family(metric).ten_year)
        ));
    }

    // Lines end in "|" with no trailing space.
    line.truncate(line.trim_end().len());
    line
}

/// Parse a single market line. `None` if any field is missing or malformed.
pub fn decode_market_line(line: &str) -> Option<MarketRecord> {
    let name = name_token(line)?;
    let (_, body) = line.split_once(':')?;
    let sections: Vec<&str> = body.split('|').collect();
    if sections.len() < SCALAR_SLOTS.len() {
        return None;
    }

    let mut scalars = [[0.0f64; 3]; 3];
    for (slot, triple) in scalars.iter_mut().enumerate() {
        *triple = decode_scalar_section(sections[slot])?;
    }

    let mut sequences: [Option<Vec<f64>>; 3] = [None, None, None];
    for section in &sections[SCALAR_SLOTS.len()..] {
        if let Some((metric, values)) = decode_sequence_section(section)? {
            sequences[metric_slot(metric)] = Some(values);
        }
    }

    let [vac_seq, rg_seq, cap_seq] = sequences;
    let family = |metric: Metric, ten_year: Vec<f64>| {
        let i = metric_slot(metric);
        MetricStats::new(scalars[0][i], scalars[1][i], scalars[2][i], ten_year)
    };

    Some(MarketRecord::new(
        name,
        family(Metric::Vacancy, vac_seq?),
        family(Metric::RentGrowth, rg_seq?),
        family(Metric::CapRate, cap_seq?),
    ))
}

fn metric_slot(metric: Metric) -> usize {
    match metric {
        Metric::Vacancy => 0,
        Metric::RentGrowth => 1,
        Metric::CapRate => 2,
    }
}

fn metric_from_label(label: &str) -> Option<Metric> {
    Metric::ALL.into_iter().find(|m| m.label() == label)
}

/// `Header: Vacancy: 1.0, Rent Growth: 2.0, Cap Rate: 3.0` -> values by metric slot.
fn decode_scalar_section(section: &str) -> Option<[f64; 3]> {
    let (_, pairs) = section.split_once(':')?;
    let mut values: [Option<f64>; 3] = [None; 3];

    for pair in pairs.split(',') {
        let Some((label, raw)) = pair.split_once(':') else {
            continue;
        };
        if let Some(metric) = metric_from_label(label.trim()) {
            values[metric_slot(metric)] = Some(parse_value(raw).ok()?);
        }
    }

    let [vac, rg, cap] = values;
    Some([vac?, rg?, cap?])
}

/// `Ten Year Vacancy: [1.0, 2.0]` -> `Some(Some((Vacancy, [1.0, 2.0])))`.
///
/// Sections with another label decode to `Some(None)`; a recognised section
/// with malformed content decodes to `None`.
fn decode_sequence_section(section: &str) -> Option<Option<(Metric, Vec<f64>)>> {
    let section = section.trim();
    let Some(rest) = section.strip_prefix("Ten Year ") else {
        return Some(None);
    };
    let Some((label, content)) = rest.split_once(':') else {
        return Some(None);
    };
    let Some(metric) = metric_from_label(label.trim()) else {
        return Some(None);
    };

    let content = content.trim();
    let inner = content.strip_prefix('[')?.strip_suffix(']')?;
    let values = inner
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| parse_value(t).ok())
        .collect::<Option<Vec<f64>>>()?;

    Some(Some((metric, values)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn austin() -> MarketRecord {
        MarketRecord::new(
            "Austin",
            MetricStats::new(0.0, 0.0, 0.0, vec![5.0; 3]),
            MetricStats::new(2.87, 52.18, 1.0, vec![1.0, 2.0, 3.0]),
            MetricStats::new(0.35, 6.42, -0.12, vec![5.25, 5.5, 5.75]),
        )
    }

    #[test]
    fn test_encode_layout() {
        let line = encode_market_line(&austin());
        assert_eq!(
            line,
            "Austin: Standard Deviation of: Vacancy: 0.0, Rent Growth: 2.87, Cap Rate: 0.35 | \
             Coefficient of variation of: Vacancy: 0.0, Rent Growth: 52.18, Cap Rate: 6.42 | \
             Beta compared to the national index of: Vacancy: 0.0, Rent Growth: 1.0, Cap Rate: -0.12 | \
             Ten Year Vacancy: [5.0, 5.0, 5.0] | \
             Ten Year Rent Growth: [1.0, 2.0, 3.0] | \
             Ten Year Cap Rate: [5.25, 5.5, 5.75] |"
        );
    }

    #[test]
    fn test_round_trip() {
        let record = austin();
        assert_eq!(decode_market_line(&encode_market_line(&record)), Some(record));
    }

    #[test]
    fn test_decode_labels_in_any_order() {
        let line = "Reno: Standard Deviation of: Cap Rate: 3, Vacancy: 1, Rent Growth: 2 | \
                    Coefficient of variation of: Rent Growth: 5, Cap Rate: 6, Vacancy: 4 | \
                    Beta compared to the national index of: Vacancy: 7, Rent Growth: 8, Cap Rate: 9 | \
                    Ten Year Cap Rate: [3] | Ten Year Vacancy: [1] | Ten Year Rent Growth: [2] |";
        let record = decode_market_line(line).unwrap();
        assert_eq!(record.name, "Reno");
        assert_eq!(record.vacancy, MetricStats::new(1.0, 4.0, 7.0, vec![1.0]));
        assert_eq!(record.rent_growth, MetricStats::new(2.0, 5.0, 8.0, vec![2.0]));
        assert_eq!(record.cap_rate, MetricStats::new(3.0, 6.0, 9.0, vec![3.0]));
    }

    #[test]
    fn test_decode_scientific_notation() {
        let mut record = austin();
        record.cap_rate.std_dev = 1.0e-7;
        let line = encode_market_line(&record);
        assert_eq!(decode_market_line(&line).unwrap().cap_rate.std_dev, 1.0e-7);
    }

    #[test]
    fn test_decode_fails_closed_on_bad_number() {
        let line = encode_market_line(&austin()).replace("52.18", "52.1x");
        assert_eq!(decode_market_line(&line), None);

        let line = encode_market_line(&austin()).replace("[5.25, 5.5, 5.75]", "[5.25, oops]");
        assert_eq!(decode_market_line(&line), None);
    }

    #[test]
    fn test_decode_fails_closed_on_missing_field() {
        let line = encode_market_line(&austin()).replace("Cap Rate: 6.42", "");
        assert_eq!(decode_market_line(&line), None);

        let line = encode_market_line(&austin()).replace(" Ten Year Cap Rate: [5.25, 5.5, 5.75] |", "");
        assert_eq!(decode_market_line(&line), None);

        assert_eq!(decode_market_line("Austin"), None);
        assert_eq!(decode_market_line("Austin: | |"), None);
    }

    #[test]
    fn test_empty_sequence() {
        let mut record = austin();
        record.vacancy.ten_year.clear();
        assert_eq!(decode_market_line(&encode_market_line(&record)), Some(record));
    }

    #[test]
    fn test_name_token() {
        assert_eq!(name_token("Austin: Standard Deviation of: ..."), Some("Austin"));
        assert_eq!(name_token("  San Antonio  : x"), Some("San Antonio"));
        assert_eq!(name_token("no colon here"), None);
        assert_eq!(name_token(" : x"), None);
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            values in prop::collection::vec(-1.0e4f64..1.0e4, 9),
            vac in prop::collection::vec(-100.0f64..100.0, 0..12),
            rg in prop::collection::vec(-100.0f64..100.0, 0..12),
            cap in prop::collection::vec(-100.0f64..100.0, 0..12),
        ) {
            let r = |v: f64| mvol_core::round2(v);
            let record = MarketRecord::new(
                "Prop Market",
                MetricStats::new(r(values[0]), r(values[1]), r(values[2]), vac),
                MetricStats::new(r(values[3]), r(values[4]), r(values[5]), rg),
                MetricStats::new(r(values[6]), r(values[7]), r(values[8]), cap),
            );
            prop_assert_eq!(decode_market_line(&encode_market_line(&record)), Some(record));
        }
    }
}
