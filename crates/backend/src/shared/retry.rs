//! Ограниченные повторы с нарастающей случайной задержкой.
//!
//! Используется движком создания документов: при конфликте номера
//! конкурирующие писатели разводятся по времени, чтобы повторное
//! столкновение стало маловероятным.

use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Максимум попыток на один вызов создания
    pub max_attempts: u32,
    /// База геометрического роста задержки, мс
    pub base_delay_ms: u64,
    /// Диапазон случайной добавки растёт линейно с номером попытки, мс
    pub jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 25,
            jitter_ms: 50,
        }
    }
}

impl RetryPolicy {
    /// Задержка перед попыткой `attempt` (нумерация с нуля).
    ///
    /// Первая попытка стартует немедленно; далее база удваивается с
    /// каждой попыткой, а случайная добавка равномерна в диапазоне,
    /// пропорциональном номеру попытки.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exp = (attempt - 1).min(16);
        let base = self.base_delay_ms.saturating_mul(1u64 << exp);
        let jitter_range = self.jitter_ms.saturating_mul(attempt as u64);
        let jitter = if jitter_range == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_range)
        };
        Duration::from_millis(base.saturating_add(jitter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_attempt_is_immediate() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_before(0), Duration::ZERO);
    }

    #[test]
    fn test_delay_grows_geometrically() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay_ms: 20,
            jitter_ms: 10,
        };
        for attempt in 1..5u32 {
            let min = Duration::from_millis(20 * (1 << (attempt - 1)));
            let max = min + Duration::from_millis(10 * attempt as u64);
            for _ in 0..50 {
                let d = policy.delay_before(attempt);
                assert!(d >= min, "attempt {}: {:?} < {:?}", attempt, d, min);
                assert!(d <= max, "attempt {}: {:?} > {:?}", attempt, d, max);
            }
        }
    }

    #[test]
    fn test_zero_jitter_is_deterministic() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay_ms: 30,
            jitter_ms: 0,
        };
        assert_eq!(policy.delay_before(1), Duration::from_millis(30));
        assert_eq!(policy.delay_before(2), Duration::from_millis(60));
        assert_eq!(policy.delay_before(3), Duration::from_millis(120));
    }
}
