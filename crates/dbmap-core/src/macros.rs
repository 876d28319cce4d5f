// params
/// Build named statement parameters: `params! { "id" => 7, "name" => "bob" }`.
/// An empty invocation yields `Params::None`.
#[macro_export]
macro_rules! params {
    () => {
        $crate::statement::Params::None
    };
    ( $( $name:expr => $value:expr ),+ $(,)? ) => {{
        let mut map = ::std::collections::HashMap::new();
        $(
            map.insert(
                ::std::string::String::from($name),
                $crate::value::Value::from($value),
            );
        )+
        $crate::statement::Params::Named(map)
    }};
}
