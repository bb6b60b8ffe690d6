/// Форматирует сумму с разделителями тысяч (пробелами) и двумя знаками
/// после запятой — для сообщений о нарушениях политики и логов.
///
/// # Примеры
/// ```
/// use backend::shared::format::format_amount;
/// assert_eq!(format_amount(1234567.5), "1 234 567.50");
/// assert_eq!(format_amount(42.0), "42.00");
/// ```
pub fn format_amount(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let s = whole.to_string();
    let mut grouped = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    let grouped: String = grouped.chars().rev().collect();

    let sign = if negative { "-" } else { "" };
    format!("{}{}.{:02}", sign, grouped, frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(42.0), "42.00");
        assert_eq!(format_amount(999.9), "999.90");
        assert_eq!(format_amount(1000.0), "1 000.00");
        assert_eq!(format_amount(15000.0), "15 000.00");
        assert_eq!(format_amount(1234567.5), "1 234 567.50");
        assert_eq!(format_amount(-1500.25), "-1 500.25");
    }
}
