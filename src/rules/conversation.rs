//! Canned conversational rules: greetings, time, small talk, gratitude,
//! farewells, fun facts, the programming glossary and jokes.

use crate::random::choose;
use crate::{Intent, Pattern, Rule};

/// Theory-of-computation facts for "fun fact" requests.
pub(crate) const FACTS: &[&str] = &[
    "Every regular language can be represented by DFA, NFA, and regex.",
    "Some context-free languages are not regular.",
    "The pumping lemma can prove certain languages are not regular.",
    "Turing machines can simulate any computer algorithm!",
];

pub(crate) const JOKES: &[&str] = &[
    "Why did the programmer quit his job? Because he didn't get arrays.",
    "Why do Java developers wear glasses? Because they don't C#.",
    "Why did the functions stop calling each other? Because they had constant arguments.",
    "A SQL query walks into a bar, walks up to two tables and asks: 'Can I join you?'",
    "Why do programmers prefer dark mode? Because light attracts bugs.",
    "There are 10 types of people in the world: those who understand binary and those who don't.",
    "Why was the computer cold? It left its Windows open.",
    "Why did the programmer go broke? Because he used up all his cache.",
    "Debugging: Removing the needles from the haystack.",
    "I would tell you a UDP joke, but you might not get it.",
    "Why do Python programmers have low self-esteem? They constantly compare themselves to others.",
    "Why was the equal sign so humble? Because it knew it wasn’t less than or greater than anyone else.",
    "Parallel lines have so much in common… it’s a shame they’ll never meet.",
    "Why was six afraid of seven? Because 7 8 9.",
    "Why did the student do multiplication problems on the floor? The teacher told him not to use tables.",
    "Why don’t scientists trust atoms? Because they make up everything.",
];

// Keys are matched against normalized text, so "what's up" is spelled the way
// the normalizer leaves it.
const SMALL_TALK: &[(&str, &str)] = &[
    ("how are you", "I'm just a bot, but I'm vibing! How about you?"),
    ("whats up", "Just chatting with cool people like you!"),
    ("how's it going", "Going great! Ready to solve math or run code?"),
];

const GLOSSARY: &[(&str, &str)] = &[
    ("what is a function", "A function is a block of code that performs a specific task."),
    ("explain loop", "A loop repeats a set of instructions until a condition is met."),
    ("what is a variable", "A variable stores data that can be used and modified in your program."),
];

pub fn rule_good_morning() -> Rule {
    rule! {
        name: "good morning",
        intent: Intent::Greeting,
        pattern: phrases!["good morning"],
        prod: |_utt, _m, _scope| { Some("Good morning! Hope you have a great day!".to_string()) },
    }
}

pub fn rule_good_afternoon() -> Rule {
    rule! {
        name: "good afternoon",
        intent: Intent::Greeting,
        pattern: phrases!["good afternoon"],
        prod: |_utt, _m, _scope| { Some("Good afternoon! How’s your day going?".to_string()) },
    }
}

pub fn rule_good_evening() -> Rule {
    rule! {
        name: "good evening",
        intent: Intent::Greeting,
        pattern: phrases!["good evening"],
        prod: |_utt, _m, _scope| { Some("Good evening! How was your day?".to_string()) },
    }
}

pub fn rule_good_night() -> Rule {
    rule! {
        name: "good night",
        intent: Intent::Greeting,
        pattern: phrases!["good night"],
        prod: |_utt, _m, _scope| { Some("Good night! Sleep well!".to_string()) },
    }
}

/// Plain substring test, so "this", "you" and "they" all count as greetings.
pub fn rule_greeting() -> Rule {
    rule! {
        name: "greeting",
        intent: Intent::Greeting,
        pattern: phrases!["hi", "hello", "hey", "yo"],
        prod: |_utt, _m, _scope| {
            Some("Hey! I'm your bot. Ask me to solve math, run code, or tell you a joke.".to_string())
        },
    }
}

/// Any mention of "time" gets the current wall-clock time.
pub fn rule_time_query() -> Rule {
    rule! {
        name: "time query",
        intent: Intent::TimeQuery,
        pattern: phrases!["time"],
        prod: |_utt, _m, scope| { Some(scope.context.reference_time.format("It's %H:%M:%S").to_string()) },
    }
}

pub fn rule_small_talk() -> Rule {
    rule! {
        name: "small talk",
        intent: Intent::SmallTalk,
        pattern: Pattern::Table(SMALL_TALK),
        prod: |_utt, m, _scope| { m.entry.map(str::to_string) },
    }
}

pub fn rule_gratitude() -> Rule {
    rule! {
        name: "gratitude",
        intent: Intent::Gratitude,
        pattern: phrases!["thank you", "thanks", "thx"],
        prod: |_utt, _m, _scope| { Some("You're welcome! 😎".to_string()) },
    }
}

pub fn rule_farewell() -> Rule {
    rule! {
        name: "farewell",
        intent: Intent::Farewell,
        pattern: phrases!["bye", "goodbye", "see you", "later"],
        prod: |_utt, _m, _scope| { Some("Bye! Catch you later! 👋".to_string()) },
    }
}

pub fn rule_fun_fact() -> Rule {
    rule! {
        name: "fun fact",
        intent: Intent::FunFact,
        pattern: phrases!["fun fact", "tell me something interesting"],
        prod: |_utt, _m, scope| { choose(scope.random, FACTS).map(str::to_string) },
    }
}

pub fn rule_glossary() -> Rule {
    rule! {
        name: "programming glossary",
        intent: Intent::Glossary,
        pattern: Pattern::Table(GLOSSARY),
        prod: |_utt, m, _scope| { m.entry.map(str::to_string) },
    }
}

pub fn rule_joke() -> Rule {
    rule! {
        name: "joke",
        intent: Intent::Joke,
        pattern: phrases!["joke"],
        prod: |_utt, _m, scope| { choose(scope.random, JOKES).map(str::to_string) },
    }
}
