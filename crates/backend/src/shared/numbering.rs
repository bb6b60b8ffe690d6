//! Нумерация документов: серия, разбор и форматирование номеров.
//!
//! Серия задаётся парой (организация, год): все номера серии имеют вид
//! `{префикс}-{год}-{NNNNN}` с суффиксом фиксированной ширины. Сканирование
//! существующих номеров даёт только базу для кандидата; единственная
//! гарантия уникальности — уникальный индекс в БД, проверяемый при commit.

/// Ширина числового суффикса номера документа
pub const SEQUENCE_WIDTH: usize = 5;

/// Префикс серии, связанный с периодом: "REC" + 2026 → "REC-2026-"
pub fn series_prefix(kind_prefix: &str, year: i32) -> String {
    format!("{}-{}-", kind_prefix, year)
}

/// Разобрать номер документа строго по формату серии.
///
/// Возвращает числовой суффикс, только если после префикса стоят ровно
/// `SEQUENCE_WIDTH` цифр и ничего больше. Номера альтернативных подсерий
/// (например, "REC-2026-QP-001") в каноническую последовательность не
/// входят и отбрасываются.
pub fn parse_sequence(document_no: &str, prefix: &str) -> Option<u32> {
    let suffix = document_no.strip_prefix(prefix)?;
    if suffix.len() != SEQUENCE_WIDTH {
        return None;
    }
    if !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

/// Максимальный суффикс среди номеров серии; 0, если номеров нет
pub fn highest_sequence<'a, I>(numbers: I, prefix: &str) -> u32
where
    I: IntoIterator<Item = &'a str>,
{
    numbers
        .into_iter()
        .filter_map(|n| parse_sequence(n, prefix))
        .max()
        .unwrap_or(0)
}

/// Сформировать номер-кандидат: база + 1 + смещение попытки.
///
/// Возвращает `None`, когда кандидат не помещается в фиксированную
/// ширину суффикса — серия исчерпана, расширять поле молча нельзя:
/// строгий разбор на других узлах перестал бы видеть такие номера.
pub fn format_document_no(prefix: &str, highest_seen: u32, offset: u32) -> Option<String> {
    let candidate = highest_seen.checked_add(1)?.checked_add(offset)?;
    if candidate >= 10u32.pow(SEQUENCE_WIDTH as u32) {
        return None;
    }
    Some(format!(
        "{}{:0width$}",
        prefix,
        candidate,
        width = SEQUENCE_WIDTH
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_prefix() {
        assert_eq!(series_prefix("REC", 2026), "REC-2026-");
        assert_eq!(series_prefix("ORD", 2025), "ORD-2025-");
    }

    #[test]
    fn test_parse_sequence_strict() {
        let p = "REC-2026-";
        assert_eq!(parse_sequence("REC-2026-00001", p), Some(1));
        assert_eq!(parse_sequence("REC-2026-00042", p), Some(42));
        assert_eq!(parse_sequence("REC-2026-99999", p), Some(99999));

        // подсерии и отклонения формата не входят в последовательность
        assert_eq!(parse_sequence("REC-2026-QP-001", p), None);
        assert_eq!(parse_sequence("REC-2026-1234", p), None); // 4 цифры
        assert_eq!(parse_sequence("REC-2026-000001", p), None); // 6 цифр
        assert_eq!(parse_sequence("REC-2026-0000a", p), None);
        assert_eq!(parse_sequence("REC-2026-00001-X", p), None);
        assert_eq!(parse_sequence("REC-2025-00001", p), None); // другой год
        assert_eq!(parse_sequence("", p), None);
    }

    #[test]
    fn test_highest_sequence() {
        let p = "REC-2026-";
        let numbers = [
            "REC-2026-00001",
            "REC-2026-00003",
            "REC-2026-00002",
            "REC-2026-QP-001",
            "ORD-2026-00099",
        ];
        assert_eq!(highest_sequence(numbers.iter().copied(), p), 3);
        assert_eq!(highest_sequence(std::iter::empty(), p), 0);
    }

    #[test]
    fn test_format_document_no() {
        let p = "REC-2026-";
        assert_eq!(
            format_document_no(p, 3, 0).as_deref(),
            Some("REC-2026-00004")
        );
        assert_eq!(
            format_document_no(p, 3, 1).as_deref(),
            Some("REC-2026-00005")
        );
        assert_eq!(
            format_document_no(p, 0, 0).as_deref(),
            Some("REC-2026-00001")
        );
    }

    #[test]
    fn test_format_offsets_strictly_increase() {
        let p = "REC-2026-";
        for offset in 1..10u32 {
            let prev = format_document_no(p, 7, offset - 1).unwrap();
            let next = format_document_no(p, 7, offset).unwrap();
            let prev_seq = parse_sequence(&prev, p).unwrap();
            let next_seq = parse_sequence(&next, p).unwrap();
            assert!(next_seq > prev_seq);
        }
    }

    #[test]
    fn test_format_determinism() {
        let p = "REC-2026-";
        assert_eq!(format_document_no(p, 41, 2), format_document_no(p, 41, 2));
    }

    #[test]
    fn test_format_overflow_is_hard_failure() {
        let p = "REC-2026-";
        assert_eq!(format_document_no(p, 99_999, 0), None);
        assert_eq!(format_document_no(p, 99_998, 1), None);
        assert_eq!(
            format_document_no(p, 99_998, 0).as_deref(),
            Some("REC-2026-99999")
        );
        assert_eq!(format_document_no(p, u32::MAX, 0), None);
    }
}
