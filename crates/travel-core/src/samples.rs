/// A canned question the user can load into the input fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub question: &'static str,
    pub city: Option<&'static str>,
}

/// Built-in examples, one per kind of tool the backend routes to.
pub const SAMPLES: &[Sample] = &[
    Sample {
        question: "What is the weather in Paris?",
        city: Some("Paris"),
    },
    Sample {
        question: "Define passport",
        city: None,
    },
    Sample {
        question: "Is it safe to travel to Lagos?",
        city: None,
    },
    Sample {
        question: "Best travel route from Abuja to Accra",
        city: None,
    },
    Sample {
        question: "Weather condition in Tokyo today",
        city: Some("Tokyo"),
    },
    Sample {
        question: "Meaning of visa",
        city: None,
    },
];

/// Look up a sample by its 1-based position in [`SAMPLES`].
pub fn sample(number: usize) -> Option<&'static Sample> {
    number.checked_sub(1).and_then(|i| SAMPLES.get(i))
}
