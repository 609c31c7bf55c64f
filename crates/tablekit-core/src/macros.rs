/// Build a [`Values`](crate::value::Values) mapping in keyword-argument style.
///
/// ```ignore
/// let filters = values! { first_name: "Sam" };
/// let row = values! { first_name: "John", last_name: "Test", age: 10 };
/// ```
#[macro_export]
macro_rules! values {
    () => {
        $crate::value::Values::new()
    };
    ($($name:ident : $value:expr),+ $(,)?) => {
        $crate::value::Values::new()$(.with(stringify!($name), $value))+
    };
}
