use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const NUMBERS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()+_-=}{[]|:;\"/?.><,`~";

pub const MIN_PASSWORD_LENGTH: usize = 4;
pub const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PasswordOptions {
    pub length: usize,
    pub numbers: bool,
    pub symbols: bool,
    pub uppercase: bool,
    /// Every enabled character class appears at least once.
    pub strict: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            length: 10,
            numbers: false,
            symbols: false,
            uppercase: true,
            strict: false,
        }
    }
}

pub fn generate_password(options: &PasswordOptions) -> String {
    generate_password_with(&mut rand::thread_rng(), options)
}

pub fn generate_password_with<R: Rng>(rng: &mut R, options: &PasswordOptions) -> String {
    let length = options.length.clamp(MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH);

    let mut classes: Vec<&[u8]> = vec![LOWERCASE];
    if options.uppercase {
        classes.push(UPPERCASE);
    }
    if options.numbers {
        classes.push(NUMBERS);
    }
    if options.symbols {
        classes.push(SYMBOLS);
    }
    let pool: Vec<u8> = classes.iter().flat_map(|class| class.iter().copied()).collect();

    let mut chars: Vec<u8> = Vec::with_capacity(length);
    if options.strict {
        for class in classes.iter() {
            chars.push(class[rng.gen_range(0..class.len())]);
        }
    }
    while chars.len() < length {
        chars.push(pool[rng.gen_range(0..pool.len())]);
    }
    chars.shuffle(rng);

    chars.into_iter().map(char::from).collect()
}
