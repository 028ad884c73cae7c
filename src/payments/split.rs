/// Stripe's card processing estimate: 2.9% + 30 cents.
const PROCESSOR_PERCENT: f64 = 2.9;
const PROCESSOR_FLAT_CENTS: i64 = 30;

/// How a gross charge divides between the processor, the platform, and the
/// hosting user's connected account. All amounts are cents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentSplit {
    pub gross_cents: i64,
    pub processor_fee_cents: i64,
    pub platform_fee_cents: i64,
    /// Transfer amount for the host, before Stripe deducts its own fee on the
    /// platform side. Always `gross - platform_fee`.
    pub host_net_cents: i64,
}

impl PaymentSplit {
    /// Estimates the processor fee, then takes `platform_percent` of what
    /// remains as the application fee. Ambassadors pay no platform fee.
    pub fn compute(gross_cents: i64, platform_percent: f64, ambassador: bool) -> Self {
        let gross_cents = gross_cents.max(0);

        let processor_fee_cents = if gross_cents == 0 {
            0
        } else {
            ((gross_cents as f64 * PROCESSOR_PERCENT / 100.0).round() as i64 + PROCESSOR_FLAT_CENTS)
                .min(gross_cents)
        };

        let remainder = gross_cents - processor_fee_cents;
        let platform_fee_cents = if ambassador {
            0
        } else {
            ((remainder as f64 * platform_percent / 100.0).round() as i64).clamp(0, gross_cents)
        };

        PaymentSplit {
            gross_cents,
            processor_fee_cents,
            platform_fee_cents,
            host_net_cents: gross_cents - platform_fee_cents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sums_back_to_gross() {
        for gross in [100, 999, 2500, 10_000, 123_457] {
            let split = PaymentSplit::compute(gross, 10.0, false);
            assert_eq!(
                split.platform_fee_cents + split.host_net_cents,
                split.gross_cents,
                "platform fee + host payout should equal gross for {}",
                gross
            );
        }
    }

    #[test]
    fn test_typical_split() {
        // $25.00 gross: processor = 73 + 30 = 103, remainder 2397, 10% = 240
        let split = PaymentSplit::compute(2500, 10.0, false);
        assert_eq!(split.processor_fee_cents, 103);
        assert_eq!(split.platform_fee_cents, 240);
        assert_eq!(split.host_net_cents, 2260);
    }

    #[test]
    fn test_ambassador_pays_no_platform_fee() {
        let split = PaymentSplit::compute(2500, 10.0, true);
        assert_eq!(split.platform_fee_cents, 0);
        assert_eq!(split.host_net_cents, 2500);
    }

    #[test]
    fn test_zero_gross() {
        let split = PaymentSplit::compute(0, 10.0, false);
        assert_eq!(split.processor_fee_cents, 0);
        assert_eq!(split.platform_fee_cents, 0);
        assert_eq!(split.host_net_cents, 0);
    }

    #[test]
    fn test_tiny_charge_never_goes_negative() {
        let split = PaymentSplit::compute(25, 10.0, false);
        assert!(split.processor_fee_cents <= split.gross_cents);
        assert!(split.platform_fee_cents >= 0);
        assert!(split.host_net_cents >= 0);
    }

    #[test]
    fn test_negative_gross_clamped() {
        let split = PaymentSplit::compute(-500, 10.0, false);
        assert_eq!(split.gross_cents, 0);
        assert_eq!(split.host_net_cents, 0);
    }
}
