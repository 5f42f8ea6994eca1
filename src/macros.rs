#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

#[macro_export]
macro_rules! re {
    ($pat:literal) => {
        $crate::Pattern::Regex($crate::regex!($pat))
    };
}

#[macro_export]
macro_rules! raw_re {
    ($pat:literal) => {
        $crate::Pattern::RawRegex($crate::regex!($pat))
    };
}

#[macro_export]
macro_rules! phrases {
    ($($phrase:literal),+ $(,)?) => {
        $crate::Pattern::Phrases(&[ $($phrase),+ ])
    };
}

#[macro_export]
macro_rules! raw_phrases {
    ($($phrase:literal),+ $(,)?) => {
        $crate::Pattern::RawPhrases(&[ $($phrase),+ ])
    };
}

#[macro_export]
macro_rules! rule {
    (
        name: $name:expr,
        intent: $intent:expr,
        pattern: $pattern:expr
        $(, traits: $traits:expr)?
        , prod: |$utt:pat_param, $m:pat_param, $scope:pat_param| $body:block
        $(,)?
    ) => {{
        $crate::Rule {
            name: $name,
            intent: $intent,
            pattern: $pattern,
            production: Box::new(
                move |$utt: &$crate::Utterance, $m: &$crate::Match, $scope: &$crate::engine::Scope<'_>| -> Option<String> {
                    $body
                },
            ),
            traits: { 0 $(| $traits)? },
        }
    }};
}
