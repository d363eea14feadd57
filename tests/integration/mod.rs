mod helpers;
mod test_affected;
mod test_run;
