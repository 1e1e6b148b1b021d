use rust_decimal::Decimal;

/// All monetary values. Kept in whole currency units; every formula that can
/// yield a fraction truncates toward zero exactly once.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%), never as percentages. The
/// parameter reader converts percent inputs once, at the boundary.
pub type Rate = Decimal;

/// Absolute calendar year, used for cross-building aggregation and taxation.
pub type CalendarYear = i32;

/// 1-based year number relative to a building's own purchase year. The
/// monthly loan table reuses the same type for its 1-based month number.
pub type YearIndex = i32;

/// Truncate toward zero, clamping negatives to zero. Used wherever a
/// repayment or balance formula may briefly go negative.
pub fn positive_or_zero(value: Money) -> Money {
    if value >= Decimal::ZERO {
        value.trunc()
    } else {
        Decimal::ZERO
    }
}
