//! Money arithmetic for amounts stored in `NUMERIC(14, 2)` columns.
//!
//! Rounding is half away from zero, the way Postgres rounds `NUMERIC` and
//! the way `es-VE` amounts are printed.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{AppError, AppResult};

/// Largest amount a `NUMERIC(14, 2)` column holds.
pub const MONTO_MAXIMO: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2); // 999_999_999_999.99

/// Largest exchange rate a `NUMERIC(14, 4)` column holds.
pub const TASA_MAXIMA: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 4); // 9_999_999_999.9999

/// Upper bound for the quantity of a cotizacion line.
pub const CANTIDAD_MAXIMA: i32 = 1_000_000;

pub const MONTO_EXCEDIDO: &str = "El monto excede el máximo permitido";

/// Round to cents, half away from zero.
pub fn redondear(valor: Decimal) -> Decimal {
    valor.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// IVA of `base` at `porcentaje`, rounded to cents.
pub fn iva(base: Decimal, porcentaje: Decimal) -> AppResult<Decimal> {
    base.checked_mul(porcentaje)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .map(redondear)
        .ok_or_else(excedido)
}

/// `cantidad * precio_unitario`.
pub fn importe(cantidad: i32, precio_unitario: Decimal) -> AppResult<Decimal> {
    precio_unitario
        .checked_mul(Decimal::from(cantidad))
        .ok_or_else(excedido)
}

pub fn sumar(a: Decimal, b: Decimal) -> AppResult<Decimal> {
    a.checked_add(b).ok_or_else(excedido)
}

/// Checked sum of every amount yielded by `valores`.
pub fn sumar_todos<I>(valores: I) -> AppResult<Decimal>
where
    I: IntoIterator<Item = AppResult<Decimal>>,
{
    valores
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, valor| sumar(acc, valor?))
}

/// Whether `valor` fits a `NUMERIC(14, 2)` column.
pub fn cabe_en_columna(valor: Decimal) -> bool {
    valor.abs() <= MONTO_MAXIMO
}

fn excedido() -> AppError {
    AppError::InvalidInput(MONTO_EXCEDIDO.to_string())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_redondear_half_away_from_zero() {
        assert_eq!(redondear(dec("2.345")), dec("2.35"));
        assert_eq!(redondear(dec("2.335")), dec("2.34"));
        assert_eq!(redondear(dec("-2.345")), dec("-2.35"));
        assert_eq!(redondear(dec("2.344")), dec("2.34"));
    }

    #[test]
    fn test_iva_rounds_half_cent_up() {
        // 29.3125 * 8% = 2.345
        assert_eq!(iva(dec("0.15"), dec("16")).unwrap(), dec("0.02"));
        assert_eq!(iva(dec("29.3125"), dec("8")).unwrap(), dec("2.35"));
        assert_eq!(iva(dec("100.50"), dec("0")).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_overflow_is_an_error_not_a_panic() {
        assert!(matches!(
            iva(Decimal::MAX, dec("16")),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            importe(2, Decimal::MAX),
            Err(AppError::InvalidInput(_))
        ));
        assert!(sumar(Decimal::MAX, Decimal::ONE).is_err());
        assert!(sumar_todos([Ok(Decimal::MAX), Ok(Decimal::MAX)]).is_err());
        assert_eq!(
            sumar_todos([Ok(dec("1.10")), Ok(dec("2.20"))]).unwrap(),
            dec("3.30")
        );
    }

    #[test]
    fn test_column_bounds() {
        assert_eq!(MONTO_MAXIMO, dec("999999999999.99"));
        assert_eq!(TASA_MAXIMA, dec("9999999999.9999"));
        assert!(cabe_en_columna(dec("999999999999.99")));
        assert!(!cabe_en_columna(dec("1000000000000")));
    }
}
