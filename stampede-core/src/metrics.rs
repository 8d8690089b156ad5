/// Metric names a `#[transaction]` reports under.
#[derive(Copy, Clone, Debug)]
pub struct TransactionLabels {
    pub success: &'static str,
    pub error: &'static str,
    pub latency: &'static str,
}

#[macro_export]
macro_rules! generate_labels {
    ($base_name:ident) => {
        $crate::TransactionLabels {
            success: concat!(stringify!($base_name), "_success"),
            error: concat!(stringify!($base_name), "_error"),
            latency: concat!(stringify!($base_name), "_latency"),
        }
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn labels_from_ident() {
        let labels = generate_labels!(get_poster);
        assert_eq!(labels.success, "get_poster_success");
        assert_eq!(labels.error, "get_poster_error");
        assert_eq!(labels.latency, "get_poster_latency");
    }
}
