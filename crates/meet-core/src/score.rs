//! Per-discipline score functions.
//!
//! Both disciplines rank "higher is better", so the strength index and the
//! run index feed the same allocator. `None` means unscored, which is not
//! the same as a score of zero: unscored athletes sort last and always get
//! zero points.

use crate::{
  athlete::{Athlete, Sex},
  parse::parse_clock_time,
};

/// Reference time for the run index: a 13:00 run scores exactly 1.0.
pub const ANCHOR_SECONDS: f64 = 780.0;

/// Numerator of the strength index.
const STRENGTH_SCALE: f64 = 600.0;

/// Coefficients `a..f` of the bodyweight polynomial
/// `a + b·x + c·x² + d·x³ + e·x⁴ + f·x⁵`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolynomialCoefficients {
  pub a: f64,
  pub b: f64,
  pub c: f64,
  pub d: f64,
  pub e: f64,
  pub f: f64,
}

impl PolynomialCoefficients {
  pub fn evaluate(&self, x: f64) -> f64 {
    // Horner form.
    ((((self.f * x + self.e) * x + self.d) * x + self.c) * x + self.b) * x + self.a
  }
}

pub const MALE: PolynomialCoefficients = PolynomialCoefficients {
  a: 47.461_788_54,
  b: 8.472_061_379,
  c: 0.073_694_103_46,
  d: -0.001_395_833_811,
  e: 7.076_659_730_707_43e-6,
  f: -1.208_043_364_823_15e-8,
};

pub const FEMALE: PolynomialCoefficients = PolynomialCoefficients {
  a: -125.425_539_8,
  b: 13.712_194_19,
  c: -0.033_072_506_31,
  d: -0.001_050_400_051,
  e: 9.387_738_814_627_99e-6,
  f: -2.333_461_388_495_4e-8,
};

/// The polynomial for `sex`, or `None` if that sex is not scored.
pub fn coefficients_for(sex: Sex) -> Option<&'static PolynomialCoefficients> {
  match sex {
    Sex::Male => Some(&MALE),
    Sex::Female => Some(&FEMALE),
    Sex::Unspecified => None,
  }
}

/// Bodyweight-normalised strength index: `600 / P(bodyweight) * total`.
pub fn dots(total: f64, bodyweight: f64, sex: Sex) -> Option<f64> {
  if !(total > 0.0 && bodyweight > 0.0 && total.is_finite() && bodyweight.is_finite()) {
    return None;
  }
  let coefficients = coefficients_for(sex)?;

  let denominator = coefficients.evaluate(bodyweight);
  if !denominator.is_finite() || denominator == 0.0 {
    return None;
  }

  let score = STRENGTH_SCALE / denominator * total;
  score.is_finite().then_some(score)
}

/// Neutral time index: `780 / seconds`. Faster runs score higher.
pub fn run_index(seconds: f64) -> Option<f64> {
  if !(seconds > 0.0 && seconds.is_finite()) {
    return None;
  }
  Some(ANCHOR_SECONDS / seconds)
}

/// Strength index for an athlete's entered lifts and bodyweight.
pub fn strength_score(athlete: &Athlete) -> Option<f64> {
  dots(athlete.total(), athlete.bodyweight?, athlete.sex)
}

/// Run index for an athlete's entered time. Blank or malformed → unscored.
pub fn run_score(athlete: &Athlete) -> Option<f64> {
  parse_clock_time(&athlete.run_time)
    .seconds()
    .and_then(run_index)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn naive(c: &PolynomialCoefficients, x: f64) -> f64 {
    c.a + c.b * x + c.c * x.powi(2) + c.d * x.powi(3) + c.e * x.powi(4) + c.f * x.powi(5)
  }

  fn close(a: f64, b: f64) -> bool { (a - b).abs() <= 1e-9 * b.abs().max(1.0) }

  #[test]
  fn matches_documented_polynomial() {
    let expected = 600.0 / naive(&MALE, 100.0) * 600.0;
    let got = dots(600.0, 100.0, Sex::Male).unwrap();
    assert!(close(got, expected), "{got} vs {expected}");
    // Sanity: a 600 kg total at 100 kg lands in the familiar 400s.
    assert!(got > 400.0 && got < 480.0);

    let expected = 600.0 / naive(&FEMALE, 60.0) * 300.0;
    let got = dots(300.0, 60.0, Sex::Female).unwrap();
    assert!(close(got, expected), "{got} vs {expected}");
  }

  #[test]
  fn unscored_inputs() {
    assert_eq!(dots(500.0, 80.0, Sex::Unspecified), None);
    assert_eq!(dots(500.0, 0.0, Sex::Male), None);
    assert_eq!(dots(0.0, 80.0, Sex::Female), None);
    assert_eq!(dots(-10.0, 80.0, Sex::Female), None);
    assert_eq!(dots(500.0, f64::INFINITY, Sex::Male), None);
  }

  #[test]
  fn run_index_anchor() {
    assert_eq!(run_index(780.0), Some(1.0));
    assert_eq!(run_index(390.0), Some(2.0));
    assert_eq!(run_index(0.0), None);
    assert_eq!(run_index(-5.0), None);
  }

  #[test]
  fn athlete_scores() {
    let mut a = Athlete::new("Jo");
    assert_eq!(strength_score(&a), None);
    assert_eq!(run_score(&a), None);

    a.sex = Sex::Male;
    a.bodyweight = Some(90.0);
    a.squat = Some(200.0);
    a.bench = Some(130.0);
    assert!(strength_score(&a).is_some());

    a.run_time = "13:00".into();
    assert_eq!(run_score(&a), Some(1.0));
    a.run_time = "13:zz".into();
    assert_eq!(run_score(&a), None);
  }
}
