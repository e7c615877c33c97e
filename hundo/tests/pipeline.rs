use data::{CurveRecord, CurveStore, ModifierTable, PowerCurve, SpeciesAttributes, StoreHandle};
use hundo::{CheckError, Checker, Report, Verdict};
use ie::{BannerConfig, Ie, TextRecognizer};

/// Returns the same text for every crop.
struct Scripted(Option<&'static str>);

impl TextRecognizer for Scripted {
    fn recognize(&self, encoded: &[u8]) -> Option<String> {
        assert!(image::load_from_memory(encoded).is_ok(), "recognizer got an undecodable crop");
        self.0.map(str::to_string)
    }
}

fn dialga_store() -> CurveStore {
    let table = ModifierTable::reference();
    let attrs = SpeciesAttributes {
        name: "dialga".to_string(),
        hp: 100,
        attack: 120,
        defense: 120,
        sp_attack: 150,
        sp_defense: 100,
        speed: 90,
    };
    let stats = attrs.derive().balanced(&table);
    CurveStore::from_records([CurveRecord {
        ndex: 483,
        name: attrs.name,
        curve: PowerCurve::build(&stats, &table, data::HUNDO_BONUS),
    }])
}

fn checker(text: Option<&'static str>) -> Checker {
    let ie = Ie::with_recognizer(BannerConfig::default(), Scripted(text));
    Checker::new(ie, StoreHandle::new(dialga_store()))
}

/// 400×800 light PNG, optionally with a dark banner-sized block.
fn screenshot(with_banner: bool) -> Vec<u8> {
    let img = image::RgbImage::from_fn(400, 800, |x, y| {
        let dark = with_banner && (100..300).contains(&x) && (200..260).contains(&y);
        image::Rgb(if dark { [40, 45, 50] } else { [220, 225, 230] })
    });
    let mut bytes = std::io::Cursor::new(Vec::new());
    img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    bytes.into_inner()
}

#[test]
fn hundo_cp_matches_its_level() {
    let verdict = checker(Some("Dialga CP 2307")).check(&screenshot(true)).unwrap();
    assert_eq!(
        verdict,
        Verdict::Hundo {
            text: "Dialga CP 2307".to_string(),
            name: "dialga".to_string(),
            cp: 2307,
            level: 20,
        }
    );
    assert!(verdict.is_hundo());
}

#[test]
fn ocr_noise_is_tolerated() {
    let verdict = checker(Some("e DIALGA CP4038")).check(&screenshot(true)).unwrap();
    assert!(matches!(verdict, Verdict::Hundo { level: 40, .. }), "{verdict:?}");
}

#[test]
fn other_cp_is_not_a_hundo() {
    let verdict = checker(Some("Dialga CP 2337")).check(&screenshot(true)).unwrap();
    assert!(matches!(verdict, Verdict::NotHundo { cp: 2337, .. }), "{verdict:?}");
    assert_eq!(verdict.message(), "dialga at CP 2337 is not a hundo");
}

#[test]
fn unknown_species_is_reported_as_such() {
    let verdict = checker(Some("Palkia CP 2307")).check(&screenshot(true)).unwrap();
    assert!(matches!(verdict, Verdict::UnknownSpecies { ref name, .. } if name == "palkia"), "{verdict:?}");
}

#[test]
fn text_without_claim_is_unreadable() {
    let verdict = checker(Some("Power up")).check(&screenshot(true)).unwrap();
    assert!(matches!(verdict, Verdict::Unreadable { ref text, .. } if text == "Power up"), "{verdict:?}");
}

#[test]
fn empty_recognition_is_no_text() {
    let verdict = checker(None).check(&screenshot(true)).unwrap();
    assert_eq!(verdict, Verdict::NoText);
}

#[test]
fn blank_screenshot_has_no_banner() {
    let verdict = checker(Some("Dialga CP 2307")).check(&screenshot(false)).unwrap();
    assert!(matches!(verdict, Verdict::NoBanner { .. }), "{verdict:?}");
    assert_eq!(verdict.message(), "could not interpret image");
}

#[test]
fn garbage_bytes_are_an_error() {
    let err = checker(Some("Dialga CP 2307")).check(b"not a png").unwrap_err();
    assert!(matches!(err, CheckError::Image(ie::LocateError::Decode(_))));
}

#[test]
fn published_store_is_used_by_later_checks() {
    let checker = checker(Some("Dialga CP 2307"));
    let shot = screenshot(true);
    assert!(checker.check(&shot).unwrap().is_hundo());

    checker.store().publish(CurveStore::default());
    assert!(matches!(checker.check(&shot).unwrap(), Verdict::UnknownSpecies { .. }));
}

#[test]
fn report_flattens_the_verdict() {
    let verdict = checker(Some("Dialga CP 2307")).check(&screenshot(true)).unwrap();
    let json = serde_json::to_value(Report::new("shot.png", &verdict)).unwrap();
    assert_eq!(json["file"], "shot.png");
    assert_eq!(json["hundo"], true);
    assert_eq!(json["outcome"], "hundo");
    assert_eq!(json["level"], 20);
    assert_eq!(json["message"], "dialga at CP 2307 is a hundo (level 20)");
}
