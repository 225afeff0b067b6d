//! Citation label styles.

use crate::names::Person;

/// Computes the base citation label of an entry, before deduplication.
pub trait LabelStyle {
    /// Label from the entry's key, people and year.
    fn label(&self, key: &str, people: &[Person], year: Option<&str>) -> String;
}

/// Alphabetic labels in the style of BibTeX's `alpha.bst`.
///
/// `Smi20` for one author, `GW20` for two to four, `ABC+20` for five or
/// more. Entries without people use the first three characters of the key.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlphaLabelStyle;

impl LabelStyle for AlphaLabelStyle {
    fn label(&self, key: &str, people: &[Person], year: Option<&str>) -> String {
        let mut label = match people {
            [] => key.chars().take(3).collect(),
            [one] => surname_letters(one).take(3).collect(),
            few if few.len() <= 4 => few.iter().filter_map(|p| surname_letters(p).next()).collect(),
            many => {
                let mut initials: String = many[..3]
                    .iter()
                    .filter_map(|p| surname_letters(p).next())
                    .collect();
                initials.push('+');
                initials
            }
        };
        if let Some(year) = year {
            let digits: Vec<char> = year.chars().filter(char::is_ascii_digit).collect();
            label.extend(&digits[digits.len().saturating_sub(2)..]);
        }
        label
    }
}

/// Alphanumeric characters of `von Last`, with the particle's first letter
/// capitalised as `alpha.bst` does.
fn surname_letters(person: &Person) -> impl Iterator<Item = char> + '_ {
    let von_initial = person
        .von
        .chars()
        .find(|c| c.is_alphanumeric())
        .into_iter()
        .flat_map(char::to_uppercase);
    let last = person.last.chars().filter(|c| c.is_alphanumeric());
    von_initial.chain(last)
}
