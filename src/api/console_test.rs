use super::*;

#[test]
fn alarm_list_endpoint_formats_page() {
    assert_eq!(alarm_list_endpoint(3), "/alarmList/3");
}

#[test]
fn monitor_list_endpoint_formats_page() {
    assert_eq!(monitor_list_endpoint(1), "/monitorList/1");
}
