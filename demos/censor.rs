use expletive::ProfaneStr;

fn main() {
    // Okay words are unaffected.
    show("Hello world!");

    // Bad words are masked.
    show("Hello shit world ass");

    // Obfuscation is mostly ignored.
    show("$h1t f-u_c_k b i t c h");
}

fn show(text: &str) {
    println!("{} -> {}", text, text.sanitized());
}
