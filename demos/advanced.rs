use expletive::{Algorithm, Config, Detector};

fn main() {
    let mut config = Config::default();
    config.detection.whole_words_only = true;
    config.detection.algorithm = Algorithm::Aho;
    config.masking.pattern_char = '?';
    config.masking.preserve_first = false;
    let mut detector = Detector::with_config(config).unwrap();

    detector.set_languages(["en", "de", "ru"], None);
    detector.add_phrase("son of a bitch");

    let sanitized = detector.sanitize("123 Crap");
    assert_eq!(sanitized, "123 ????");

    for text in ["so eine scheisse", "ах ты сука", "you son of the a bitch"] {
        let detection = detector.detect(text);
        println!("{:?} -> {:?}", text, detection.matches);
        assert!(detection.has_profanity);
    }
}
