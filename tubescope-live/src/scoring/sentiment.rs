//! Lexicon-based sentiment classification
//!
//! A description is positive (or negative) when more than 70% of its
//! non-stop-words come from the positive (or negative) lexicon. A batch takes
//! the majority tag, and that majority must also beat the neutral share.

use super::TextScorer;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use tubescope_common::Sentiment;

/// Share of words needed to tag a single description
const DOMINANCE_THRESHOLD: f64 = 0.7;

static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "happy", "happier", "happiest", "happily", "happiness", "happifying", "joy", "joyful",
        "joyfully", "joyous", "joyousness", "enjoy", "enjoyable", "enjoyed", "enjoying",
        "enjoyment", "excite", "excited", "exciting", "excitedly", "excitingly", "excitable",
        "excitement", "excitedness", "love", "loved", "loving", "loves", "lovable", "lovingly",
        "lover", "cheer", "cheerful", "cheerfully", "cheerfulness", "cheering", "cheered",
        "cheerier", "cheeriest", "great", "greater", "greatest", "greatly", "greatness",
        "amazing", "amazed", "amazingly", "amazement", "amazingness", "amaze", "content",
        "contented", "contentedly", "contentment", "contenting", "bliss", "blissful",
        "blissfully", "blissfulness", "elated", "elating", "elation", "elatedly", "pleased",
        "pleasedly", "pleasing", "pleases", "pleasingly", "pleasure", "gratified", "gratify",
        "gratification", "gratifying", "gratifiedly", "euphoria", "euphoric", "euphorically",
        "euphorias", "delight", "delightful", "delightfully", "delighted", "delighting",
        "delightfulness", "merry", "merrier", "merriest", "merrily", "merriment", "optimistic",
        "optimistically", "optimism", "optimist", "positive", "positively", "positivity",
        "grateful", "gratefully", "gratitude", "gratefulness", "radiant", "radiance",
        "radiantly", "radiating", "satisfy", "satisfied", "satisfying", "satisfaction",
        "satisfiedly", "satisfactorily", "gleeful", "gleefully", "gleefulness", "lively",
        "livelier", "liveliest", "liveliness", "thrilled", "thrilling", "thrill",
        "thrillingly", "thrilledly", "sunshine", "sunshiney", "sunshiny", "sunny", "sunniest",
        "jovial", "jovially", "jovialness", "bright", "brighter", "brightest", "brightness",
        "brightly", "successful", "successfully", "success", "successes", "lucky", "luckier",
        "luckiest", "luckily", "fun", "funner", "funnest", "playful", "playfully",
        "playfulness", "playfulnesses", "enthusiastic", "enthusiastically", "enthusiasm",
        "enthusiast",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "sad", "sadness", "sadly", "saddened", "saddening", "unhappy", "unhappily",
        "unhappiness", "depressed", "depressing", "depression", "depressingly", "down",
        "downward", "downer", "downed", "downing", "miserable", "miserably", "misery", "miserableness",
        "heartbroken", "heartbreak", "heartbrokenly", "heartbreaking", "lonely", "lonelier",
        "loneliest", "loneliness", "lonesome", "lonesomely", "angry", "angrily", "anger",
        "angering", "angered", "hopeless", "hopelessly", "hopelessness", "sorrow", "sorrowful",
        "sorrowfully", "sorrowing", "sorrowed", "gloom", "gloomy", "gloomily", "gloominess",
        "glooming", "gloomed", "regret", "regretted", "regrettable", "regretful",
        "regretfully", "regretting", "frustrated", "frustrating", "frustration",
        "frustratedly", "frustratingly", "despair", "despaired", "despairing", "desperation",
        "desperate", "desperately", "anguish", "anguished", "anguishing", "anguishly",
        "melancholy", "melancholic", "melancholically", "distressed", "distressing",
        "distressingly", "distressedly", "worried", "worrying", "worry", "worryingly", "grief",
        "grieved", "grieving", "grievingly", "dismay", "dismayed", "dismaying", "dismayingly",
        "dejected", "dejection", "dejectedly", "dejecting", "defeated", "defeat", "defeating",
        "defeatedly", "bitter", "bitterly", "bitterness", "bittered", "despondent",
        "despondently", "despondency", "downcast", "downcasting", "downcasted", "unfortunate",
        "unfortunates", "unfortunateness", "broke", "breaking", "broken", "confused",
        "confusing", "confusion", "confusedly", "isolated", "isolation", "isolatedly",
        "embittered", "embittering", "embitteredly", "tragically", "tragedy", "empty",
        "emptier", "emptiest", "emptiness", "painful", "painfully", "pain", "pained", "paining",
        "shattered", "shattering", "shatteredness", "shatteringly", "crying", "cry", "cried",
        "cries", "cryingly", "lament", "lamented", "lamenting", "lamentably", "lamentation",
        "vulnerable", "vulnerability", "vulnerably", "sick", "sickly", "sicker", "sickened",
        "sickening", "sickeningly", "tearful", "tearfully", "tears", "teared", "disappointed",
        "disappointing", "disappointingly", "disappointment", "shame", "shameful",
        "shamefully", "shamed", "weak", "weaker", "weakness", "weakly", "crushed", "crushing",
        "crushedly", "crush", "insecure", "insecurity", "insecurities", "insecurely",
        "pessimistic", "pessimism", "pessimistically", "pessimist",
    ]
    .into_iter()
    .collect()
});

/// Prepositions, conjunctions, pronouns and interjections excluded from the word total
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "about", "above", "across", "after", "against", "along", "among", "around", "at",
        "before", "behind", "below", "beneath", "beside", "between", "beyond", "by", "down",
        "during", "for", "from", "in", "inside", "into", "like", "near", "of", "off", "on",
        "onto", "outside", "over", "past", "since", "through", "throughout", "to", "toward",
        "under", "underneath", "until", "up", "upon", "with", "within", "without", "although",
        "and", "as", "because", "but", "if", "nor", "once", "or", "so", "than", "that", "then",
        "though", "unless", "when", "whenever", "where", "wherever", "whether", "while", "yet",
        "all", "anybody", "anyone", "anything", "each", "either", "everybody", "everyone",
        "everything", "few", "he", "her", "hers", "herself", "him", "himself", "his", "i", "it",
        "its", "itself", "many", "me", "mine", "myself", "neither", "nobody", "none", "nothing",
        "one", "ours", "ourselves", "she", "some", "somebody", "someone", "something", "their",
        "theirs", "them", "themselves", "these", "they", "this", "those", "us", "we", "what",
        "whatever", "which", "who", "whom", "whose", "you", "yours", "yourself", "yourselves",
        "ah", "aha", "alas", "bravo", "ew", "hey", "hmm", "hurray", "oh", "oops", "ouch",
        "phew", "ugh", "wow", "yay", "yikes",
    ]
    .into_iter()
    .collect()
});

/// Sentiment scorer run behind the `sentiment-analyzer` service
#[derive(Debug, Default, Clone, Copy)]
pub struct SentimentScorer;

impl TextScorer for SentimentScorer {
    type Output = Sentiment;

    fn name(&self) -> &'static str {
        super::SENTIMENT_SERVICE
    }

    fn score(&self, descriptions: &[String]) -> Sentiment {
        classify_batch(descriptions)
    }
}

/// Classify one description
pub fn classify_text(text: &str) -> Sentiment {
    let normalized: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphabetic() { c } else { ' ' })
        .collect();
    let words: Vec<&str> = normalized.split_whitespace().collect();

    let positive = words.iter().filter(|w| POSITIVE_WORDS.contains(*w)).count();
    let negative = words.iter().filter(|w| NEGATIVE_WORDS.contains(*w)).count();
    let stop = words.iter().filter(|w| STOP_WORDS.contains(*w)).count();

    let counted = words.len() - stop;
    if counted == 0 {
        return Sentiment::Neutral;
    }

    let total = counted as f64;
    if positive as f64 / total > DOMINANCE_THRESHOLD {
        Sentiment::Positive
    } else if negative as f64 / total > DOMINANCE_THRESHOLD {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Classify a batch by majority of per-description tags
pub fn classify_batch(descriptions: &[String]) -> Sentiment {
    let (mut positive, mut negative, mut neutral) = (0usize, 0usize, 0usize);
    for description in descriptions {
        match classify_text(description) {
            Sentiment::Positive => positive += 1,
            Sentiment::Negative => negative += 1,
            Sentiment::Neutral => neutral += 1,
        }
    }

    if positive == negative {
        Sentiment::Neutral
    } else if positive > negative {
        if positive > neutral {
            Sentiment::Positive
        } else {
            Sentiment::Neutral
        }
    } else if negative > neutral {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}
