use crate::ebs_fields::GenericEbsResponseFields;

pub const MASK_CHAR: char = '*';
pub const VISIBLE_PREFIX: usize = 6;
pub const VISIBLE_SUFFIX: usize = 4;

/// Keeps the first six and last four characters, preserving length.
/// Already-masked values are returned as is.
pub fn mask_pan(pan: &str) -> String {
    if pan.contains(MASK_CHAR) {
        return pan.to_string();
    }

    let len = pan.chars().count();
    let (prefix, suffix) = if len > VISIBLE_PREFIX + VISIBLE_SUFFIX {
        (VISIBLE_PREFIX, VISIBLE_SUFFIX)
    } else if len > VISIBLE_SUFFIX {
        (0, VISIBLE_SUFFIX)
    } else {
        (0, 0)
    };

    pan.chars()
        .enumerate()
        .map(|(i, c)| {
            if i < prefix || i >= len - suffix {
                c
            } else {
                MASK_CHAR
            }
        })
        .collect()
}

pub fn masked(fields: &GenericEbsResponseFields) -> GenericEbsResponseFields {
    GenericEbsResponseFields {
        pan: mask_pan(&fields.pan),
        ..fields.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PANS: &[&str] = &[
        "9222081700176714465",
        "4111111111111111",
        "123456789012",
        "12345678901",
        "1234567890",
        "12345",
        "1234",
        "",
    ];

    #[test]
    fn keeps_prefix_and_suffix_of_card_numbers() {
        assert_eq!(mask_pan("9222081700176714465"), "922208*********4465");
        assert_eq!(mask_pan("4111111111111111"), "411111******1111");
    }

    #[test]
    fn short_values_never_expose_a_prefix() {
        assert_eq!(mask_pan("1234567890"), "******7890");
        assert_eq!(mask_pan("12345"), "*2345");
        assert_eq!(mask_pan("1234"), "****");
        assert_eq!(mask_pan(""), "");
    }

    #[test]
    fn masking_is_idempotent_and_length_preserving() {
        for pan in PANS {
            let once = mask_pan(pan);
            assert_eq!(mask_pan(&once), once, "not idempotent for {pan:?}");
            assert_eq!(once.chars().count(), pan.chars().count());
        }
    }

    #[test]
    fn long_pans_keep_exactly_the_visible_digits() {
        for pan in PANS.iter().filter(|p| p.len() > VISIBLE_PREFIX + VISIBLE_SUFFIX) {
            let masked = mask_pan(pan);
            assert_eq!(&masked[..VISIBLE_PREFIX], &pan[..VISIBLE_PREFIX]);
            assert_eq!(
                &masked[masked.len() - VISIBLE_SUFFIX..],
                &pan[pan.len() - VISIBLE_SUFFIX..]
            );
            assert_eq!(
                masked.chars().filter(|c| *c == MASK_CHAR).count(),
                pan.len() - VISIBLE_PREFIX - VISIBLE_SUFFIX
            );
        }
    }

    #[test]
    fn only_the_pan_of_the_copy_changes() {
        let original = GenericEbsResponseFields {
            pan: "9222081700176714465".into(),
            to_card: "9222081700176714466".into(),
            terminal_id: "18000377".into(),
            ..Default::default()
        };

        let copy = masked(&original);

        assert_eq!(original.pan, "9222081700176714465");
        assert_eq!(copy.pan, "922208*********4465");
        assert_eq!(copy.to_card, original.to_card);
        assert_eq!(copy.terminal_id, original.terminal_id);
    }
}
