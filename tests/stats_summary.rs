use wbi_atlas::stats::summarize;
use wbi_atlas::{IndicatorSeries, Observation, SelectedCountry};

#[test]
fn summary_per_country() {
    let obs = |pairs: &[(i32, Option<f64>)]| {
        IndicatorSeries::new(
            pairs
                .iter()
                .map(|(date, value)| Observation { date: *date, value: *value })
                .collect(),
        )
    };
    let fetched = vec![
        (
            SelectedCountry::new("DEU", "Germany"),
            obs(&[
                (2022, None),
                (2021, Some(4.0)),
                (2020, Some(1.0)),
                (2019, Some(2.0)),
                (2018, Some(3.0)),
            ]),
        ),
        (SelectedCountry::new("ATA", "Antarctica"), obs(&[(2021, None)])),
    ];

    let s = summarize(&fetched);
    assert_eq!(s.len(), 2);

    let de = &s[0];
    assert_eq!(de.code, "DEU");
    assert_eq!((de.count, de.missing), (4, 1));
    assert_eq!(de.min, Some(1.0));
    assert_eq!(de.max, Some(4.0));
    assert_eq!(de.mean, Some(2.5));
    assert_eq!(de.median, Some(2.5));
    assert_eq!(de.latest, Some((2021, 4.0)));

    let aq = &s[1];
    assert_eq!(aq.count, 0);
    assert_eq!(aq.missing, 1);
    assert!(aq.mean.is_none() && aq.median.is_none() && aq.latest.is_none());
}
