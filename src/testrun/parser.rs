use combine::parser::byte::{bytes, digit, space, spaces};
use combine::parser::range::take_while1;
use combine::{any, attempt, many1, optional, sep_by1, skip_many, skip_many1, token, Parser};

/// Parses a test runner's final tally, e.g. `8 passed, 2 failed in 0.12s`,
/// into a list of counts with their outcome words.
pub fn summary<'a>() -> impl Parser<&'a [u8], Output = Vec<(u32, &'a [u8])>> {
    (
        sep_by1::<Vec<_>, _, _, _>(outcome(), (token(b','), spaces())),
        optional(attempt((skip_many1(space()), bytes(b"in "), skip_many(any())))),
    )
        .map(|(outcomes, _)| outcomes)
}

fn outcome<'a>() -> impl Parser<&'a [u8], Output = (u32, &'a [u8])> {
    (
        count(),
        skip_many1(space()),
        take_while1(|b: u8| b.is_ascii_alphabetic()),
    )
        .map(|(n, _, word)| (n, word))
}

fn count<'a>() -> impl Parser<&'a [u8], Output = u32> {
    many1::<Vec<u8>, _, _>(digit()).map(|digits| {
        digits.iter().fold(0u32, |acc, d| {
            acc.saturating_mul(10).saturating_add(u32::from(d - b'0'))
        })
    })
}
