mod mock_sms_tests;
mod twilio_messaging_tests;

use mazad_core::{CanonicalPhone, PhoneNormalizer};

/// `+9647701234567`
pub(crate) fn test_phone() -> CanonicalPhone {
    PhoneNormalizer::new("964", 9, 10)
        .unwrap()
        .normalize("07701234567")
        .unwrap()
}
