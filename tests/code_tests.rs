#[cfg(test)]
mod code_proptests {
    use proptest::prelude::*;

    use gridkey::*;

    proptest! {
        #[test]
        fn proptest_bits_roundtrip(key in any::<u64>()) {
            let bits = encode_bits(key, KEY_BITS).unwrap();
            prop_assert_eq!(bits.len(), 64);
            prop_assert!(bits.chars().all(|c| c == '0' || c == '1'));
            prop_assert_eq!(decode_bits(&bits), key);
        }

        #[test]
        fn proptest_narrow_width(value in 0u32..256) {
            let bits = encode_bits(value, 8).unwrap();
            prop_assert_eq!(bits.len(), 8);
            prop_assert_eq!(decode_bits(&bits), value as u64);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn proptest_render_and_read(
            key in any::<u64>(),
            side in prop_oneof![Just(300u32), Just(600)],
        ) {
            let code = CodeBuilder::new(key).side(side).build().unwrap();
            let mut frames = ImageFrames::new([code.to_frame()]);
            let got = CodeReader::new().read(&mut frames, &Never).unwrap();
            prop_assert_eq!(got, Some(key));
        }
    }
}

#[cfg(test)]
mod code_tests {
    use image::{imageops, DynamicImage, GrayImage, Luma};
    use test_case::test_case;

    use gridkey::*;

    #[test_case(0; "all black")]
    #[test_case(1; "last bit")]
    #[test_case(12345; "small key")]
    #[test_case(0x8000_0000_0000_0000; "first bit")]
    #[test_case(u64::MAX; "all white")]
    fn test_end_to_end(key: u64) {
        let code = encode(key);
        assert_eq!(code.bits().as_str(), format!("{key:064b}"));

        let mut frames = ImageFrames::new([code.to_frame()]);
        assert_eq!(decode(&mut frames).unwrap(), Some(key));
    }

    #[test]
    fn test_code_in_busy_frame() {
        let key = 0x0F1E_2D3C_4B5A_6978;
        let mut frame = GrayImage::from_pixel(1280, 720, Luma([210]));
        imageops::replace(&mut frame, encode(key).as_image(), 400, 60);

        let mut frames = ImageFrames::new([
            DynamicImage::ImageLuma8(GrayImage::from_pixel(1280, 720, Luma([210]))),
            DynamicImage::ImageLuma8(frame),
        ]);
        let mut states = Vec::new();
        let got = CodeReader::new()
            .read_with(&mut frames, &Never, |_, scan| states.push(scan.state()))
            .unwrap();

        assert_eq!(got, Some(key));
        assert_eq!(states, vec![ReadState::Searching, ReadState::Accepted]);
    }

    #[test]
    fn test_saved_code_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("code.png");
        encode(424242).save(&path).unwrap();

        let mut frames = ImageFrames::from_paths([&path]);
        assert_eq!(decode(&mut frames).unwrap(), Some(424242));
        assert!(frames.is_closed());
    }

    #[test]
    fn test_encode_bits_rejects_overflow() {
        assert!(encode_bits(255u32, 8).is_ok());
        let err = encode_bits(256u32, 8).unwrap_err();
        assert!(matches!(err, CodeError::InvalidKey { key: 256, width: 8 }));
    }

    #[test]
    fn test_store_and_read() {
        use rand::{rngs::StdRng, SeedableRng};

        let dir = tempfile::tempdir().unwrap();
        let mut store = RecordStore::open(dir.path().join("records.txt")).unwrap();
        let rec = store.create("visitor", "room 12", &mut StdRng::seed_from_u64(3)).unwrap();

        let mut frames = ImageFrames::new([encode(rec.key).to_frame()]);
        let key = decode(&mut frames).unwrap().unwrap();
        assert_eq!(store.lookup(key).unwrap(), Some(rec));
    }
}
