//! Benchmarks for boundary classification and word study in mia-core.
//!
//! Run with: `cargo bench -p mia-core --bench classify`

use divan::{
  Bencher,
  black_box,
};
use mia_core::{
  case_convention::Separators,
  classify::{
    WordTypePolicy,
    is_hump_bound_word,
    is_word_type_end,
    is_word_type_start,
  },
  word_range::{
    WordQuery,
    word_range_at,
  },
  word_study::{
    WordStudy,
    classify,
  },
};
use ropey::Rope;

fn main() {
  divan::main();
}

const SOURCE: &str = "    let myHTMLParser = Parser::new(CONFIG_VALUE, some_snake_name, $dollar);\n";

mod boundaries {
  use super::*;

  #[divan::bench(args = [
    WordTypePolicy::SpaceDelimited,
    WordTypePolicy::Mia,
    WordTypePolicy::Identifier,
  ])]
  fn starts_and_ends(bencher: Bencher, policy: WordTypePolicy) {
    let rope = Rope::from(SOURCE);
    bencher.bench(|| {
      let text = rope.slice(..);
      let mut count = 0;
      for offset in 0..=text.len_chars() {
        count += is_word_type_start(policy, text, black_box(offset), true) as usize;
        count += is_word_type_end(policy, text, black_box(offset), true) as usize;
      }
      count
    });
  }

  #[divan::bench]
  fn humps(bencher: Bencher) {
    let rope = Rope::from(SOURCE);
    bencher.bench(|| {
      let text = rope.slice(..);
      (0..=text.len_chars())
        .filter(|&offset| is_hump_bound_word(text, black_box(offset), true))
        .count()
    });
  }

  #[divan::bench]
  fn word_range(bencher: Bencher) {
    let rope = Rope::from(SOURCE);
    bencher.bench(|| {
      let text = rope.slice(..);
      word_range_at(text, black_box(14), black_box(14), WordQuery::identifier())
    });
  }
}

mod study {
  use super::*;

  #[divan::bench(args = ["myHTMLParser", "CONFIG_VALUE", "some_snake_name", "dash-case-name"])]
  fn classify_word(word: &str) {
    black_box(classify(black_box(word), Separators::all()));
  }

  #[divan::bench]
  fn make_screaming(bencher: Bencher) {
    let study = WordStudy::new("someCamelCaseWord");
    bencher.bench(|| study.make_screaming_snake_case());
  }
}
